//! Retry-until-populated fetching for gateway lists that come back empty for a
//! beat after (re)authentication.

use serde_json::Value;
use std::{fmt::Display, future::Future, time::Duration};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Fixed pause between attempts, no backoff growth.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self { max_attempts: 3, delay: Duration::from_millis(1000) } }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self { Self { max_attempts, delay } }

    pub fn immediate(max_attempts: u32) -> Self { Self::new(max_attempts, Duration::ZERO) }
}

/// A non-empty array, or an object whose `orders` array is non-empty.
pub fn is_populated(payload: &Value) -> bool {
    match payload {
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => obj.get("orders").and_then(Value::as_array).is_some_and(|o| !o.is_empty()),
        _ => false,
    }
}

/// Calls `fetch` until it yields a populated payload or the attempts run out,
/// in which case an empty array is returned. Errors are retried except on the
/// final attempt, where they propagate.
pub async fn fetch_with_retry<F, Fut, E>(policy: &RetryPolicy, label: &str, mut fetch: F) -> Result<Value, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, E>>,
    E: Display,
{
    for attempt in 1..=policy.max_attempts {
        let last = attempt == policy.max_attempts;
        match fetch().await {
            Ok(payload) if is_populated(&payload) => return Ok(payload),
            Ok(_) => debug!(target: "portal", endpoint = label, attempt, "empty payload"),
            Err(e) if last => return Err(e),
            Err(e) => warn!(target: "portal", endpoint = label, attempt, "fetch failed, retrying: {}", e),
        }
        if !last {
            tokio::time::sleep(policy.delay).await;
        }
    }
    Ok(Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn populated_shapes() {
        assert!(is_populated(&json!([1])));
        assert!(is_populated(&json!({"orders": [{"orderId": 1}]})));
        assert!(!is_populated(&json!([])));
        assert!(!is_populated(&json!({"orders": []})));
        assert!(!is_populated(&json!({"snapshot": true})));
        assert!(!is_populated(&Value::Null));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_populated_attempt() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let out: Result<Value, String> = fetch_with_retry(&RetryPolicy::default(), "trades", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok(if n < 3 { json!([]) } else { json!([{"execution_id": "e1"}]) }) }
        }).await;
        assert_eq!(out.unwrap(), json!([{"execution_id": "e1"}]));
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn always_empty_exhausts_attempts() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let policy = RetryPolicy::new(4, Duration::from_millis(250));
        let out: Result<Value, String> = fetch_with_retry(&policy, "orders", || {
            calls.set(calls.get() + 1);
            async { Ok(json!({"orders": []})) }
        }).await;
        assert_eq!(out.unwrap(), json!([]));
        assert_eq!(calls.get(), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn early_errors_are_swallowed() {
        let calls = Cell::new(0);
        let out: Result<Value, String> = fetch_with_retry(&RetryPolicy::default(), "positions", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { if n == 1 { Err("connection reset".to_string()) } else { Ok(json!([{"conid": 1}])) } }
        }).await;
        assert_eq!(out.unwrap(), json!([{"conid": 1}]));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn final_error_propagates() {
        let calls = Cell::new(0);
        let out: Result<Value, String> = fetch_with_retry(&RetryPolicy::immediate(2), "trades", || {
            calls.set(calls.get() + 1);
            async { Err("timeout".to_string()) }
        }).await;
        assert_eq!(out.unwrap_err(), "timeout");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_never_calls() {
        let calls = Cell::new(0);
        let out: Result<Value, String> = fetch_with_retry(&RetryPolicy::immediate(0), "trades", || {
            calls.set(calls.get() + 1);
            async { Ok(json!([1])) }
        }).await;
        assert_eq!(out.unwrap(), json!([]));
        assert_eq!(calls.get(), 0);
    }
}
