#![allow(dead_code)]

use axum::{body::Body, http::{Request, StatusCode}, Router};
use portal_api::{create_router, AppState, GatewayClient};
use portal_engine::{RetryPolicy, SessionStore};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

/// Proxy router wired to a fake gateway at `gateway_base`.
pub fn proxy(gateway_base: &str) -> (Router, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::new());
    let gateway = GatewayClient::new(gateway_base, Duration::from_secs(5), session.clone()).unwrap();
    let state = AppState::new(gateway, RetryPolicy::immediate(3));
    (create_router(state, "public"), session)
}

pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(b) => send(app, method, uri, Some("application/json"), b.to_string()).await,
        None => send(app, method, uri, None, String::new()).await,
    }
}

/// Sends a raw body, with `content_type` as given, and decodes the reply as JSON.
pub async fn send(app: &Router, method: &str, uri: &str, content_type: Option<&str>, body: String) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let response = app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, json)
}
