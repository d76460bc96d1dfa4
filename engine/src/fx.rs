//! Currency-conversion fallback: amounts and states of the convert-then-retry
//! sequence run when an order is rejected for missing base-currency cash.

use crate::types::Confirmation;
use rust_decimal::Decimal;
use std::{str::FromStr, time::Duration};

const CASH_NEEDED: &str = "CASH NEEDED";

/// Used when the rejection text carries no readable amount.
pub const DEFAULT_NEEDED_CASH: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
/// 5% headroom on top of the reported shortfall.
pub const CONVERSION_BUFFER: Decimal = Decimal::from_parts(105, 0, 0, false, 2);
/// Pause between a filled conversion and resubmitting the original order.
pub const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Amount following `CASH NEEDED` in a rejection message, thousands separators
/// stripped.
pub fn needed_cash(message: &str) -> Decimal {
    let Some(pos) = message.find(CASH_NEEDED) else { return DEFAULT_NEEDED_CASH };
    let rest = &message[pos + CASH_NEEDED.len()..];
    let is_num = |c: char| c.is_ascii_digit() || c == ',' || c == '.';
    let Some(start) = rest.find(is_num) else { return DEFAULT_NEEDED_CASH };
    let run: String = rest[start..].chars().take_while(|c| is_num(*c)).filter(|c| *c != ',').collect();
    Decimal::from_str(numeric_prefix(&run)).unwrap_or(DEFAULT_NEEDED_CASH)
}

/// Longest prefix reading as a number: stops at a second `.` and drops a
/// trailing one, so a sentence-ending period is not part of the amount.
fn numeric_prefix(run: &str) -> &str {
    let end = match run.match_indices('.').nth(1) {
        Some((second_dot, _)) => second_dot,
        None => run.len(),
    };
    run[..end].trim_end_matches('.')
}

pub fn conversion_amount(needed: Decimal) -> Decimal {
    (needed * CONVERSION_BUFFER).ceil()
}

/// Symbol searched to find the conversion contract, e.g. `USD.EUR`.
pub fn fx_symbol(base_currency: &str) -> String {
    format!("USD.{}", base_currency.trim().to_uppercase())
}

#[derive(Debug, Clone, PartialEq)]
pub enum FxState {
    Idle,
    OrderSubmitted,
    FxRequired { needed: Decimal, suggested: Decimal },
    FxSubmitted,
    RetryOriginal,
    Failed(String),
}

impl FxState {
    /// Where a classified order reply leads. Only an FX rejection opens the
    /// conversion branch; the resubmission never does.
    pub fn after_order(confirmation: &Confirmation) -> Self {
        if confirmation.is_fx {
            let needed = needed_cash(&confirmation.message);
            FxState::FxRequired { needed, suggested: conversion_amount(needed) }
        } else if confirmation.success {
            FxState::Idle
        } else {
            FxState::Failed(confirmation.message.clone())
        }
    }

    pub fn after_retry(confirmation: &Confirmation) -> Self {
        if confirmation.success { FxState::Idle } else { FxState::Failed(confirmation.message.clone()) }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FxState::Idle | FxState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn extracts_amount_with_separators() {
        let msg = "Error converting funds from USD to EUR, CASH NEEDED: 1,234.56";
        assert_eq!(needed_cash(msg), dec!(1234.56));
    }

    #[test]
    fn amount_ending_a_sentence() {
        let msg = "Error converting funds from USD to EUR. CASH NEEDED FOR THIS ORDER IS 1,234.56.";
        assert_eq!(needed_cash(msg), dec!(1234.56));
        assert_eq!(needed_cash("CASH NEEDED: 2,000."), dec!(2000));
        assert_eq!(needed_cash("CASH NEEDED: 1.5.7"), dec!(1.5));
    }

    #[test]
    fn falls_back_when_missing() {
        assert_eq!(needed_cash("Insufficient funds"), dec!(500));
        assert_eq!(needed_cash("CASH NEEDED: unknown"), dec!(500));
        assert_eq!(needed_cash("CASH NEEDED. soon"), dec!(500));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(needed_cash("cash needed: 42"), dec!(500));
    }

    #[test]
    fn conversion_rounds_up() {
        assert_eq!(conversion_amount(dec!(1000.00)), dec!(1050));
        assert_eq!(conversion_amount(dec!(1234.56)), dec!(1297));
        assert_eq!(conversion_amount(dec!(500)), dec!(525));
    }

    #[test]
    fn symbol_for_base() {
        assert_eq!(fx_symbol("eur"), "USD.EUR");
    }

    #[test]
    fn transitions_from_reply() {
        let fx = Confirmation::fx_required("CASH NEEDED: 1,000.00");
        assert_eq!(FxState::after_order(&fx), FxState::FxRequired { needed: dec!(1000.00), suggested: dec!(1050) });
        assert_eq!(FxState::after_order(&Confirmation::success("ok")), FxState::Idle);
        let failed = FxState::after_order(&Confirmation::failure("Order Failed: x"));
        assert!(failed.is_terminal());
        assert_eq!(FxState::after_retry(&fx), FxState::Failed("CASH NEEDED: 1,000.00".into()));
    }
}
