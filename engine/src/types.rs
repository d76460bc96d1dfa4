use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("Account, Contract ID and Quantity are required.")]
    MissingFields,
    #[error("Limit orders require a price.")]
    MissingLimitPrice,
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side { Buy, Sell }

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType { Mkt, Lmt }

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecType { Stk, Cash }

impl FromStr for Side {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(OrderError::UnknownVariant { kind: "side", value: s.to_string() }),
        }
    }
}

impl FromStr for OrderType {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MKT" => Ok(OrderType::Mkt),
            "LMT" => Ok(OrderType::Lmt),
            _ => Err(OrderError::UnknownVariant { kind: "order type", value: s.to_string() }),
        }
    }
}

impl FromStr for SecType {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STK" => Ok(SecType::Stk),
            "CASH" => Ok(SecType::Cash),
            _ => Err(OrderError::UnknownVariant { kind: "security type", value: s.to_string() }),
        }
    }
}

impl fmt::Display for SecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { SecType::Stk => "STK", SecType::Cash => "CASH" })
    }
}

/// Order body as the dashboard posts it to `/api/order/place`.
/// The proxy strips `accountId` before handing the rest to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub account_id: String,
    pub conid: i64,
    pub order_type: OrderType,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub tif: String,
    pub sec_type: SecType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl OrderRequest {
    pub fn market(account_id: impl Into<String>, conid: i64, side: Side, quantity: Decimal, sec_type: SecType) -> Self {
        Self { account_id: account_id.into(), conid, order_type: OrderType::Mkt, side, quantity, tif: "DAY".into(), sec_type, price: None }
    }

    pub fn limit(account_id: impl Into<String>, conid: i64, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self { order_type: OrderType::Lmt, price: Some(price), ..Self::market(account_id, conid, side, quantity, SecType::Stk) }
    }

    /// Market buy of the base-to-USD pair used to cover a cash shortfall.
    pub fn fx_conversion(account_id: impl Into<String>, conid: i64, amount: Decimal) -> Self {
        Self::market(account_id, conid, Side::Buy, amount, SecType::Cash)
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if self.account_id.trim().is_empty() || self.conid == 0 || self.quantity.is_zero() {
            return Err(OrderError::MissingFields);
        }
        if self.order_type == OrderType::Lmt && self.price.is_none() {
            return Err(OrderError::MissingLimitPrice);
        }
        Ok(())
    }
}

/// Verdict derived from an order acknowledgement; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_fx: bool,
}

impl Confirmation {
    pub fn success(message: impl Into<String>) -> Self { Self { success: true, message: message.into(), is_fx: false } }
    pub fn failure(message: impl Into<String>) -> Self { Self { success: false, message: message.into(), is_fx: false } }
    pub fn fx_required(message: impl Into<String>) -> Self { Self { success: false, message: message.into(), is_fx: true } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn order_serializes_in_gateway_shape() {
        let o = OrderRequest::limit("U123", 265598, Side::Buy, dec!(10), dec!(187.5));
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v, json!({
            "accountId": "U123", "conid": 265598, "orderType": "LMT", "side": "BUY",
            "quantity": 10.0, "tif": "DAY", "secType": "STK", "price": 187.5
        }));
    }

    #[test]
    fn market_order_omits_price() {
        let o = OrderRequest::fx_conversion("U1", 12087792, dec!(1050));
        let v = serde_json::to_value(&o).unwrap();
        assert!(v.get("price").is_none());
        assert_eq!(v["secType"], "CASH");
        assert_eq!(v["orderType"], "MKT");
    }

    #[test]
    fn validate_requires_account_conid_quantity() {
        let mut o = OrderRequest::market("", 1, Side::Buy, dec!(1), SecType::Stk);
        assert_eq!(o.validate(), Err(OrderError::MissingFields));
        o.account_id = "U1".into();
        o.quantity = dec!(0);
        assert_eq!(o.validate(), Err(OrderError::MissingFields));
        o.quantity = dec!(3);
        assert_eq!(o.validate(), Ok(()));
    }

    #[test]
    fn limit_without_price_is_rejected() {
        let mut o = OrderRequest::limit("U1", 1, Side::Sell, dec!(1), dec!(10));
        o.price = None;
        assert_eq!(o.validate(), Err(OrderError::MissingLimitPrice));
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!("lmt".parse::<OrderType>().unwrap(), OrderType::Lmt);
        assert_eq!("Cash".parse::<SecType>().unwrap(), SecType::Cash);
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn confirmation_hides_fx_flag_when_false() {
        let v = serde_json::to_value(Confirmation::success("ok")).unwrap();
        assert_eq!(v, json!({"success": true, "message": "ok"}));
        let v = serde_json::to_value(Confirmation::fx_required("x")).unwrap();
        assert_eq!(v["isFx"], true);
    }
}
