//! Client for the proxy's own HTTP surface, as the dashboard page uses it.

use crate::error::FlowError;
use portal_engine::{search::extract_results, OrderRequest, SecType};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: String,
}

impl BackendClient {
    pub fn new(base: impl Into<String>) -> Result<Self, FlowError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base: base.into().trim_end_matches('/').to_string() })
    }

    pub async fn dashboard(&self) -> Result<Value, FlowError> {
        self.call(self.http.get(format!("{}/api/dashboard", self.base)), "/api/dashboard").await
    }

    pub async fn search(&self, symbol: &str, sec_type: SecType) -> Result<Vec<Value>, FlowError> {
        let body = json!({"symbol": symbol, "secType": sec_type});
        let data = self.post("/api/search", &body).await?;
        Ok(data.get("results").map(extract_results).unwrap_or_default())
    }

    /// Raw gateway reply; classification is up to the caller.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<Value, FlowError> {
        self.post("/api/order/place", order).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, FlowError> {
        self.call(self.http.post(format!("{}{}", self.base, path)).json(body), path).await
    }

    async fn call(&self, req: reqwest::RequestBuilder, path: &str) -> Result<Value, FlowError> {
        let resp = req.send().await?;
        let status = resp.status();
        let data: Value = resp.json().await.unwrap_or_else(|_| json!({"message": "Non-JSON response from server."}));
        debug!(target: "portal", path, status = status.as_u16(), "backend call");
        if !status.is_success() {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(FlowError::Api { status: status.as_u16(), message });
        }
        Ok(data)
    }
}
