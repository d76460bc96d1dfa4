pub mod dashboard;
pub mod fx;
pub mod market;
pub mod reply;
pub mod retry;
pub mod search;
pub mod session;
pub mod types;

pub use dashboard::{assemble, first_account, CashHolding, DashboardSnapshot, Summary, Upstream};
pub use fx::{conversion_amount, fx_symbol, needed_cash, FxState};
pub use reply::{classify, OrderReply};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use session::SessionStore;
pub use types::*;
