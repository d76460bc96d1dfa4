//! Flattening of the gateway's portfolio endpoints into the dashboard snapshot.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: f64,
    pub settled_cash: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub maint_margin: f64,
    pub buying_power: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CashHolding { pub currency: String, pub amount: Value }

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub account_id: String,
    pub currency: String,
    pub summary: Summary,
    pub cash_holdings: Vec<CashHolding>,
    pub trades: Vec<Value>,
    pub orders: Vec<Value>,
    pub positions: Vec<Value>,
}

/// Raw upstream payloads feeding one snapshot.
#[derive(Debug, Default)]
pub struct Upstream {
    pub summary: Value,
    pub ledger: Value,
    pub trades: Value,
    pub orders: Value,
    pub positions: Value,
}

pub fn first_account(accounts: &Value) -> Option<String> {
    match accounts.get("accounts")?.as_array()?.first()? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn find_key<'a>(obj: &'a Value, name: &str) -> Option<&'a Value> {
    obj.as_object()?.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v)
}

fn amount(summary: &Value, name: &str) -> f64 {
    find_key(summary, name).and_then(|e| e.get("amount")).and_then(Value::as_f64).unwrap_or(0.0)
}

fn into_list(v: Value) -> Vec<Value> {
    match v { Value::Array(items) => items, _ => Vec::new() }
}

fn sum_field(items: &[Value], key: &str) -> f64 {
    items.iter().filter_map(|i| i.get(key).and_then(Value::as_f64)).sum()
}

pub fn cash_holdings(ledger: &Value, account_id: &str) -> Vec<CashHolding> {
    let Some(entries) = ledger.as_object() else { return Vec::new() };
    entries
        .iter()
        .filter(|(key, entry)| key.as_str() != "updated" && entry.get("acctcode").and_then(Value::as_str) == Some(account_id))
        .map(|(key, entry)| CashHolding { currency: key.clone(), amount: entry.get("cashbalance").cloned().unwrap_or(Value::Null) })
        .collect()
}

pub fn assemble(account_id: String, up: Upstream) -> DashboardSnapshot {
    let currency = find_key(&up.summary, "totalcashvalue")
        .and_then(|e| e.get("currency"))
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .unwrap_or("USD")
        .to_string();
    let orders = match up.orders {
        Value::Object(mut obj) => obj.remove("orders").map(into_list).unwrap_or_default(),
        _ => Vec::new(),
    };
    let trades = into_list(up.trades);
    let positions = into_list(up.positions);
    let summary = Summary {
        total: amount(&up.summary, "netliquidation"),
        settled_cash: amount(&up.summary, "settledcash"),
        unrealized_pnl: sum_field(&positions, "unrealizedPnl"),
        realized_pnl: sum_field(&trades, "realized_pnl"),
        maint_margin: amount(&up.summary, "maintmarginreq"),
        buying_power: amount(&up.summary, "buyingpower"),
    };
    let cash_holdings = cash_holdings(&up.ledger, &account_id);
    DashboardSnapshot { account_id, currency, summary, cash_holdings, trades, orders, positions }
}
