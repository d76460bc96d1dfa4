//! Order acknowledgement parsing and classification.
//!
//! The gateway answers an order placement with one object or an array of
//! loosely shaped objects. Each element is parsed into an [`OrderReply`] and
//! the first decisive one produces the [`Confirmation`].

use crate::types::Confirmation;
use serde_json::Value;

pub const FX_ACTION: &str = "convert_from_base_currency";
const FX_PHRASE: &str = "CONVERTING FUNDS";

pub const NO_RESPONSE: &str = "No response from server.";
pub const UNKNOWN_CONFIRMATION: &str = "Order submitted, but received an unknown confirmation ID.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderReply {
    Submitted { id: String, status: String },
    FxRequired { message: String },
    Rejected { text: String },
    Unknown,
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        Value::Array(_) | Value::Object(_) => Some(v.to_string()),
        _ => None,
    }
}

fn field(reply: &Value, key: &str) -> Option<String> {
    reply.get(key).filter(|v| truthy(v)).and_then(text)
}

impl OrderReply {
    pub fn parse(reply: &Value) -> Self {
        if !reply.is_object() {
            return OrderReply::Unknown;
        }
        let id = field(reply, "order_id").or_else(|| field(reply, "id"));
        let status = field(reply, "order_status");
        if let (Some(id), Some(status)) = (id, status) {
            if !status.eq_ignore_ascii_case("error") {
                return OrderReply::Submitted { id, status };
            }
        }
        let error = field(reply, "error");
        let wants_fx = reply.get("action").and_then(Value::as_str) == Some(FX_ACTION)
            || error.as_deref().is_some_and(|e| e.to_uppercase().contains(FX_PHRASE));
        if wants_fx {
            let message = error.or_else(|| field(reply, "text")).unwrap_or_default();
            return OrderReply::FxRequired { message };
        }
        match error.or_else(|| field(reply, "text")) {
            Some(text) => OrderReply::Rejected { text },
            None => OrderReply::Unknown,
        }
    }

    fn verdict(&self) -> Option<Confirmation> {
        match self {
            OrderReply::Submitted { id, status } => Some(Confirmation::success(format!("Order submitted! ID: {id}. Status: {status}"))),
            OrderReply::FxRequired { message } => Some(Confirmation::fx_required(message.clone())),
            OrderReply::Rejected { text } => Some(Confirmation::failure(format!("Order Failed: {text}"))),
            OrderReply::Unknown => None,
        }
    }
}

/// Splits a reply body into parsed elements. `None` when there is nothing to
/// inspect at all (absent body, `null`, or an empty array).
pub fn parse_replies(body: Option<&Value>) -> Option<Vec<OrderReply>> {
    match body {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Array(items)) => Some(items.iter().map(OrderReply::parse).collect()),
        Some(single) => Some(vec![OrderReply::parse(single)]),
    }
}

/// First decisive reply wins. Ambiguous bodies are reported as submitted with
/// an unknown id.
pub fn classify(body: Option<&Value>) -> Confirmation {
    let Some(replies) = parse_replies(body) else {
        return Confirmation::failure(NO_RESPONSE);
    };
    replies
        .iter()
        .find_map(OrderReply::verdict)
        .unwrap_or_else(|| Confirmation::success(UNKNOWN_CONFIRMATION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submitted_order() {
        let c = classify(Some(&json!({"order_id": "1", "order_status": "Submitted"})));
        assert_eq!(c, Confirmation::success("Order submitted! ID: 1. Status: Submitted"));
    }

    #[test]
    fn numeric_id_field_also_counts() {
        let c = classify(Some(&json!([{"id": 42, "order_status": "PreSubmitted"}])));
        assert_eq!(c.message, "Order submitted! ID: 42. Status: PreSubmitted");
        assert!(c.success);
    }

    #[test]
    fn error_status_is_not_success() {
        let r = OrderReply::parse(&json!({"order_id": "7", "order_status": "Error", "text": "rejected by risk"}));
        assert_eq!(r, OrderReply::Rejected { text: "rejected by risk".into() });
    }

    #[test]
    fn currency_conversion_by_error_text() {
        let msg = "Error converting funds from USD to EUR, CASH NEEDED: 1,234.56";
        let c = classify(Some(&json!({"error": msg})));
        assert!(!c.success);
        assert!(c.is_fx);
        assert_eq!(c.message, msg);
    }

    #[test]
    fn currency_conversion_by_action() {
        let c = classify(Some(&json!([{"action": "convert_from_base_currency", "error": "needs FX"}])));
        assert_eq!(c, Confirmation::fx_required("needs FX"));
    }

    #[test]
    fn conversion_action_carrying_only_text() {
        let c = classify(Some(&json!({"action": "convert_from_base_currency", "text": "convert first"})));
        assert_eq!(c, Confirmation::fx_required("convert first"));
        assert!(c.is_fx);
    }

    #[test]
    fn plain_error_and_text() {
        assert_eq!(classify(Some(&json!({"error": "Invalid conid"}))).message, "Order Failed: Invalid conid");
        assert_eq!(classify(Some(&json!([{"text": "Market closed"}]))).message, "Order Failed: Market closed");
    }

    #[test]
    fn nothing_to_inspect() {
        assert_eq!(classify(None), Confirmation::failure(NO_RESPONSE));
        assert_eq!(classify(Some(&Value::Null)), Confirmation::failure(NO_RESPONSE));
        assert_eq!(classify(Some(&json!([]))), Confirmation::failure(NO_RESPONSE));
    }

    #[test]
    fn scan_order_matters() {
        let body = json!([
            {"id": "q1", "message": ["Are you sure?"]},
            {"order_id": "99", "order_status": "Submitted"},
            {"error": "never reached"}
        ]);
        assert_eq!(classify(Some(&body)).message, "Order submitted! ID: 99. Status: Submitted");
    }

    #[test]
    fn ambiguous_reply_is_optimistic() {
        let c = classify(Some(&json!([null, {"foo": "bar"}])));
        assert_eq!(c, Confirmation::success(UNKNOWN_CONFIRMATION));
    }

    #[test]
    fn parse_skips_non_objects() {
        assert_eq!(OrderReply::parse(&json!("oops")), OrderReply::Unknown);
        assert_eq!(parse_replies(Some(&json!([null]))), Some(vec![OrderReply::Unknown]));
    }
}
