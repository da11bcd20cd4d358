use async_trait::async_trait;

use crate::domain::{TradeEvent, TxType};

/// Result of analyzing one trade against a wallet's current position. `None`
/// means the trade doesn't change anything worth recording.
#[derive(Debug, Clone)]
pub struct WalletPositionUpdate {
    pub smart_money: bool,
    pub prev_holding: f64,
    pub new_holding: f64,
    pub tx_type: TxType,
}

/// External collaborator: decides whether a trade moves a wallet's tracked
/// position and whether that wallet counts as "smart money". The real rule
/// engine lives outside this crate; see [`super::testing`] for a minimal
/// stand-in used in tests.
#[async_trait]
pub trait WalletPositionAnalyzer: Send + Sync {
    async fn analyze(&self, trade: &TradeEvent) -> Option<WalletPositionUpdate>;
}

/// External collaborator: turns a qualifying trade into the two rows the
/// indicator store wants. The core only guarantees at most one of each per
/// trade; how realized PnL and win rate are computed is out of scope here.
#[async_trait]
pub trait IndicatorStats: Send + Sync {
    async fn summarize(
        &self,
        trade: &TradeEvent,
        update: &WalletPositionUpdate,
    ) -> (crate::domain::WalletSummary, crate::domain::WalletTransaction);
}

/// External collaborator: the set of wallets worth writing to the
/// relational store on every balance delta, not just the analytical one.
pub trait WatchedWalletSet: Send + Sync {
    fn is_watched(&self, wallet: &str) -> bool;
}
