use crate::{
    dashboard::dashboard,
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    market,
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use portal_engine::{search::extract_results, SecType};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

pub fn create_router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let public_dir = public_dir.as_ref();
    let static_files = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));
    Router::new()
        .route("/api/status", get(status))
        .route("/api/session/connect", post(connect))
        .route("/api/session/disconnect", post(disconnect))
        .route("/api/dashboard", get(dashboard))
        .route("/api/search", get(search_query).post(search_body))
        .route("/api/market/snapshot", get(market::snapshot))
        .route("/api/market/history", get(market::history))
        .route("/api/order/place", post(place_order))
        .fallback_service(static_files)
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.gateway.get("/iserver/auth/status").await?))
}

async fn connect(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.gateway.session().clear();
    let data = state.gateway.post("/iserver/reauthenticate").await?;
    info!(target: "portal", "reauthentication requested");
    Ok(Json(data))
}

/// Never fails: local cookies are dropped whatever the gateway says.
async fn disconnect(State(state): State<AppState>) -> Json<Value> {
    if let Err(e) = state.gateway.post("/logout").await {
        warn!(target: "portal", "logout failed, clearing session anyway: {}", e);
    }
    state.gateway.session().clear();
    Json(json!({"success": true, "message": "Successfully disconnected."}))
}

#[derive(Debug, Deserialize)]
struct SearchReq {
    symbol: String,
    #[serde(rename = "secType")]
    sec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery { symbol: String }

async fn search_body(State(state): State<AppState>, ApiJson(req): ApiJson<SearchReq>) -> Result<Json<Value>, ApiError> {
    search(&state, req.symbol, req.sec_type).await
}

async fn search_query(State(state): State<AppState>, ApiQuery(q): ApiQuery<SearchQuery>) -> Result<Json<Value>, ApiError> {
    search(&state, q.symbol, Some(SecType::Stk.to_string())).await
}

async fn search(state: &AppState, symbol: String, sec_type: Option<String>) -> Result<Json<Value>, ApiError> {
    let mut body = json!({"symbol": symbol});
    if let Some(sec_type) = sec_type {
        body["secType"] = Value::String(sec_type);
    }
    let payload = state.gateway.post_json("/iserver/secdef/search", &body).await?;
    Ok(Json(json!({"results": extract_results(&payload)})))
}

fn account_segment(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Forwards the order body minus `accountId`, which becomes part of the path.
async fn place_order(State(state): State<AppState>, ApiJson(body): ApiJson<Value>) -> Result<Json<Value>, ApiError> {
    let Value::Object(mut order) = body else {
        return Err(ApiError::BadRequest("Order body must be a JSON object.".into()));
    };
    let account = order
        .remove("accountId")
        .as_ref()
        .and_then(account_segment)
        .ok_or_else(|| ApiError::BadRequest("accountId is required.".into()))?;
    info!(target: "portal", account = %account, conid = ?order.get("conid"), "placing order");
    let path = format!("/iserver/account/{account}/orders");
    let reply = state.gateway.post_json(&path, &json!({"orders": [Value::Object(order)]})).await?;
    Ok(Json(reply))
}
