use crate::{error::{ApiError, GatewayError}, gateway::GatewayClient, state::AppState};
use axum::{extract::State, Json};
use portal_engine::{assemble, fetch_with_retry, first_account, DashboardSnapshot, RetryPolicy, Upstream};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Summary and ledger degrade to `{}` and the three lists to `[]`, so once the
/// account is known the snapshot is always served.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSnapshot>, ApiError> {
    let gw = &state.gateway;
    let accounts = gw.get("/iserver/accounts").await?;
    let account_id = first_account(&accounts).ok_or_else(|| ApiError::Internal("No accounts found.".into()))?;
    debug!(target: "portal", account = %account_id, "assembling dashboard");

    let summary_path = format!("/portfolio/{account_id}/summary");
    let ledger_path = format!("/portfolio/{account_id}/ledger");
    let (summary, ledger) = tokio::join!(gw.get(&summary_path), gw.get(&ledger_path));
    let summary = or_empty_object(summary, "summary");
    let ledger = or_empty_object(ledger, "ledger");

    let trades = list(gw, &state.retry, "/iserver/account/trades").await;
    let orders = list(gw, &state.retry, "/iserver/account/orders").await;
    let positions = list(gw, &state.retry, &format!("/portfolio/{account_id}/positions/0")).await;

    Ok(Json(assemble(account_id, Upstream { summary, ledger, trades, orders, positions })))
}

fn or_empty_object(res: Result<Value, GatewayError>, what: &str) -> Value {
    match res {
        Ok(Value::Null) => Value::Object(Map::new()),
        Ok(v) => v,
        Err(e) => {
            warn!(target: "portal", "{} unavailable: {}", what, e);
            Value::Object(Map::new())
        }
    }
}

async fn list(gw: &GatewayClient, policy: &RetryPolicy, path: &str) -> Value {
    match fetch_with_retry(policy, path, || gw.get(path)).await {
        Ok(v) => v,
        Err(e) => {
            warn!(target: "portal", path, "giving up after retries: {}", e);
            Value::Array(Vec::new())
        }
    }
}
