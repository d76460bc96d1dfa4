//! HTTP client for the Client Portal Gateway. Every call carries the shared
//! session cookies and folds the response's `Set-Cookie` headers back in.

use crate::error::{upstream_message, GatewayError};
use portal_engine::SessionStore;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base: String,
    session: Arc<SessionStore>,
}

impl GatewayClient {
    /// The gateway serves a self-signed certificate on localhost, so
    /// certificate validation is off.
    pub fn new(base: impl Into<String>, timeout: Duration, session: Arc<SessionStore>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { http, base: base.into().trim_end_matches('/').to_string(), session })
    }

    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn base(&self) -> &str { &self.base }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base, path) }

    pub async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        self.send("GET", path, self.http.get(self.url(path))).await
    }

    pub async fn get_with<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Value, GatewayError> {
        self.send("GET", path, self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post(&self, path: &str) -> Result<Value, GatewayError> {
        self.send("POST", path, self.http.post(self.url(path))).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, GatewayError> {
        self.send("POST", path, self.http.post(self.url(path)).json(body)).await
    }

    async fn send(&self, method: &str, path: &str, req: RequestBuilder) -> Result<Value, GatewayError> {
        let req = match self.session.get() {
            Some(cookies) => req.header(COOKIE, cookies),
            None => req,
        };
        debug!(target: "portal", method, path, "gateway call");
        let resp = req.send().await.map_err(|e| {
            warn!(target: "portal", method, path, "gateway unreachable: {}", e);
            GatewayError::Transport(e)
        })?;
        self.remember_cookies(&resp);
        let status = resp.status();
        let body = decode(resp).await?;
        // 4xx bodies are answers, not failures: the gateway reports auth and
        // validation problems that way.
        if (200..500).contains(&status.as_u16()) {
            return Ok(body);
        }
        let message = upstream_message(&body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        warn!(target: "portal", method, path, status = status.as_u16(), "gateway error: {}", message);
        Err(GatewayError::Status { status: status.as_u16(), message })
    }

    fn remember_cookies(&self, resp: &Response) {
        let headers = resp.headers().get_all(SET_COOKIE).iter().filter_map(|h| h.to_str().ok());
        self.session.merge(headers);
    }
}

/// JSON when possible, the raw text otherwise, `null` for an empty body.
async fn decode(resp: Response) -> Result<Value, GatewayError> {
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}
