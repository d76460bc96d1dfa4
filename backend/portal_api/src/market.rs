use crate::{error::ApiError, extract::ApiQuery, state::AppState};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use portal_engine::market::{enrich_snapshot, SNAPSHOT_FIELDS};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery { conids: Option<String> }

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    conid: Option<String>,
    period: Option<String>,
    bar: Option<String>,
}

pub async fn snapshot(State(state): State<AppState>, ApiQuery(q): ApiQuery<SnapshotQuery>) -> Result<Json<Value>, ApiError> {
    let Some(conids) = q.conids.filter(|c| !c.trim().is_empty()) else {
        return Ok(Json(json!({"data": []})));
    };
    let payload = state
        .gateway
        .get_with("/iserver/marketdata/snapshot", &[("conids", conids.as_str()), ("fields", SNAPSHOT_FIELDS)])
        .await?;
    let Value::Array(items) = payload else {
        return Err(ApiError::Internal("Unexpected market snapshot payload.".into()));
    };
    let data = enrich_snapshot(items, &mut rand::thread_rng());
    Ok(Json(json!({"data": data})))
}

/// Chart data is best effort: any failure renders as an empty series.
pub async fn history(State(state): State<AppState>, query: Result<Query<HistoryQuery>, QueryRejection>) -> Json<Value> {
    let empty = || Json(json!({"data": []}));
    let Ok(Query(q)) = query else {
        return empty();
    };
    let Some(conid) = q.conid.filter(|c| !c.is_empty() && c != "undefined") else {
        return empty();
    };
    let period = q.period.unwrap_or_else(|| "1d".into());
    let bar = q.bar.unwrap_or_else(|| "5min".into());
    let query = [("conid", conid.as_str()), ("period", period.as_str()), ("bar", bar.as_str())];
    match state.gateway.get_with("/iserver/marketdata/history", &query).await {
        Ok(data) => Json(data),
        Err(e) => {
            debug!(target: "portal", conid = %conid, "history unavailable: {}", e);
            empty()
        }
    }
}
