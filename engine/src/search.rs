use serde_json::Value;

/// Pulls the result list out of a security-definition search payload and keeps
/// only entries that name both a contract id and a symbol.
pub fn extract_results(payload: &Value) -> Vec<Value> {
    let list: &[Value] = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj.values().find_map(Value::as_array).map(Vec::as_slice).unwrap_or_default(),
        _ => &[],
    };
    list.iter().filter(|r| is_tradable(r)).cloned().collect()
}

fn is_tradable(entry: &Value) -> bool {
    let present = |key: &str| match entry.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(_) | Value::Object(_)) => true,
        _ => false,
    };
    present("conid") && present("symbol")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_complete_entries_from_array() {
        let payload = json!([
            {"conid": 265598, "symbol": "AAPL", "companyName": "APPLE INC"},
            {"conid": "", "symbol": "AAPL"},
            {"symbol": "MSFT"},
            {"conid": 0, "symbol": "ZERO"}
        ]);
        assert_eq!(extract_results(&payload), vec![json!({"conid": 265598, "symbol": "AAPL", "companyName": "APPLE INC"})]);
    }

    #[test]
    fn takes_first_array_field_of_object() {
        let payload = json!({"count": 1, "results": [{"conid": "12087792", "symbol": "EUR.USD"}], "other": [{"conid": 1, "symbol": "X"}]});
        assert_eq!(extract_results(&payload), vec![json!({"conid": "12087792", "symbol": "EUR.USD"})]);
    }

    #[test]
    fn unexpected_shapes_yield_nothing() {
        assert!(extract_results(&json!({"error": "no match"})).is_empty());
        assert!(extract_results(&json!("x")).is_empty());
        assert!(extract_results(&Value::Null).is_empty());
    }
}
