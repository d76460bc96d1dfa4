use clap::Parser;
use portal_engine::RetryPolicy;
use std::{path::PathBuf, time::Duration};

/// Server settings. Every flag falls back to an environment variable, which a
/// `.env` file in the working directory may provide.
#[derive(Parser, Debug, Clone)]
#[command(name = "portal_api", about = "Dashboard proxy for the Client Portal Gateway")]
pub struct Config {
    #[arg(long, env = "IB_GATEWAY_BASE", default_value = "https://localhost:5000/v1/api")]
    pub gateway_base: String,
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,
    #[arg(long, env = "RETRY_ATTEMPTS", default_value_t = 3)]
    pub retry_attempts: u32,
    #[arg(long, env = "RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }

    pub fn upstream_timeout(&self) -> Duration { Duration::from_secs(self.upstream_timeout_secs) }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}
