use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_engine::OrderError;
use serde_json::{json, Value};
use thiserror::Error;

/// Failure talking to the Client Portal Gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Best human-readable reason carried by an upstream error body.
pub fn upstream_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|k| body.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null | Value::Bool(false) => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

/// Error returned to the dashboard as `{error: true, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    /// Request body or query the extractors could not read.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self { ApiError::Rejected { status: r.status(), message: r.body_text() } }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self { ApiError::Rejected { status: r.status(), message: r.body_text() } }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Gateway(e) => e.status().and_then(|s| StatusCode::from_u16(s).ok()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        };
        (status, Json(json!({"error": true, "message": self.to_string()}))).into_response()
    }
}

/// Failure of the client-side order flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Invalid(#[from] OrderError),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Invalid conversion amount.")]
    InvalidAmount,
    #[error("Could not find a tradable contract for {0}.")]
    NoFxContract(String),
    #[error("Currency conversion failed: {0}")]
    FxFailed(String),
}
