use crate::gateway::GatewayClient;
use portal_engine::RetryPolicy;

#[derive(Clone)]
pub struct AppState {
    pub gateway: GatewayClient,
    /// Applied to the trades, orders and positions lists.
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(gateway: GatewayClient, retry: RetryPolicy) -> Self { Self { gateway, retry } }
}
