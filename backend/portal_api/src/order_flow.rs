//! Order placement with the currency-conversion fallback.
//!
//! `Idle -> OrderSubmitted -> FxRequired -> FxSubmitted -> RetryOriginal -> Idle | Failed`.
//! The original order is resubmitted at most once; there is no cancellation
//! once the conversion order has been sent.

use crate::{client::BackendClient, error::FlowError};
use portal_engine::{classify, fx, Confirmation, FxState, OrderRequest, SecType};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Shown to the user before any conversion is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct FxPrompt {
    pub rejection: String,
    pub needed: Decimal,
    pub suggested: Decimal,
    pub pair: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    /// Every state visited, starting at `Idle`.
    pub path: Vec<FxState>,
    /// Verdict of the last order sent for the original request.
    pub confirmation: Confirmation,
    pub fx: Option<Confirmation>,
}

impl FlowReport {
    pub fn state(&self) -> Option<&FxState> { self.path.last() }
}

pub struct OrderFlow<'a> {
    client: &'a BackendClient,
    base_currency: String,
    settle_delay: Duration,
}

impl<'a> OrderFlow<'a> {
    pub fn new(client: &'a BackendClient, base_currency: impl Into<String>) -> Self {
        Self { client, base_currency: base_currency.into(), settle_delay: fx::SETTLE_DELAY }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    async fn submit(&self, order: &OrderRequest) -> Result<Confirmation, FlowError> {
        let reply: Value = self.client.place_order(order).await?;
        Ok(classify(Some(&reply)))
    }

    /// `confirm` sees the shortfall and returns the amount to convert, or
    /// `None` to drop the order.
    pub async fn run<C>(&self, order: OrderRequest, mut confirm: C) -> Result<FlowReport, FlowError>
    where
        C: FnMut(&FxPrompt) -> Option<Decimal>,
    {
        order.validate()?;
        let mut path = vec![FxState::Idle, FxState::OrderSubmitted];
        let first = self.submit(&order).await?;
        let (needed, suggested) = match FxState::after_order(&first) {
            FxState::FxRequired { needed, suggested } => (needed, suggested),
            settled => {
                path.push(settled);
                return Ok(FlowReport { path, confirmation: first, fx: None });
            }
        };
        path.push(FxState::FxRequired { needed, suggested });

        let pair = fx::fx_symbol(&self.base_currency);
        let prompt = FxPrompt { rejection: first.message.clone(), needed, suggested, pair: pair.clone() };
        info!(target: "portal", needed = %needed, suggested = %suggested, "order needs currency conversion");
        let Some(amount) = confirm(&prompt) else {
            path.push(FxState::Idle);
            return Ok(FlowReport { path, confirmation: first, fx: None });
        };
        if amount <= Decimal::ZERO {
            return Err(FlowError::InvalidAmount);
        }

        let conid = self.resolve_pair(&pair).await?;
        let fx_order = OrderRequest::fx_conversion(order.account_id.clone(), conid, amount);
        path.push(FxState::FxSubmitted);
        let fx_reply = self.submit(&fx_order).await?;
        if !fx_reply.success {
            return Err(FlowError::FxFailed(fx_reply.message));
        }
        info!(target: "portal", "conversion submitted ({}), waiting {:?} for funds to settle", fx_reply.message, self.settle_delay);
        tokio::time::sleep(self.settle_delay).await;

        path.push(FxState::RetryOriginal);
        let retried = self.submit(&order).await?;
        path.push(FxState::after_retry(&retried));
        Ok(FlowReport { path, confirmation: retried, fx: Some(fx_reply) })
    }

    async fn resolve_pair(&self, pair: &str) -> Result<i64, FlowError> {
        let results = self.client.search(pair, SecType::Cash).await?;
        results
            .first()
            .and_then(|c| c.get("conid"))
            .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.trim().parse().ok())))
            .filter(|c| *c != 0)
            .ok_or_else(|| FlowError::NoFxContract(pair.to_string()))
    }
}
