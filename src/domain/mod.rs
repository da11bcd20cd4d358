//! Wire-level and derived data types that flow through the core.
//!
//! Nothing in here owns I/O: decoding, persistence, and the indicator math
//! are all external collaborators. These types are the contract between
//! them.

mod balance_event;
mod record;
mod trade_event;

pub use balance_event::{BalanceDelta, BalanceEvent};
pub use record::{Balance, DerivedRecord, WalletSummary, WalletTransaction};
pub use trade_event::{TradeEvent, TxType, MIN_VOLUME_USD, STALE_AFTER_SECS};
