pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod market;
pub mod order_flow;
pub mod routes;
pub mod state;

pub use client::BackendClient;
pub use config::Config;
pub use error::{ApiError, FlowError, GatewayError};
pub use gateway::GatewayClient;
pub use order_flow::{FlowReport, FxPrompt, OrderFlow};
pub use routes::create_router;
pub use state::AppState;
