//! Minimal test-double implementations of the domain handlers' external
//! collaborator traits. None of this is the production rule engine — it
//! exists so [`crate::handlers`] can be unit tested without a live wallet
//! analytics service, indicator store, token catalog, or watchlist.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{TradeEvent, TxType, WalletSummary, WalletTransaction};
use crate::leaderboard::{TokenCatalog, TokenInfo};

use super::traits::{IndicatorStats, WalletPositionAnalyzer, WalletPositionUpdate, WatchedWalletSet};

/// Treats every non-dust trade from a fixed set of wallets as smart money
/// buying; everything else is a no-op.
pub struct FixedSmartMoneyAnalyzer {
    smart_wallets: HashSet<String>,
}

impl FixedSmartMoneyAnalyzer {
    pub fn new(smart_wallets: impl IntoIterator<Item = String>) -> Self {
        Self {
            smart_wallets: smart_wallets.into_iter().collect(),
        }
    }
}

#[async_trait]
impl WalletPositionAnalyzer for FixedSmartMoneyAnalyzer {
    async fn analyze(&self, trade: &TradeEvent) -> Option<WalletPositionUpdate> {
        // The wire event carries no buy/sell flag; classifying direction is
        // the real analyzer's job. This stand-in always reports a buy.
        Some(WalletPositionUpdate {
            smart_money: self.smart_wallets.contains(&trade.wallet),
            prev_holding: 0.0,
            new_holding: trade.volume_usd,
            tx_type: TxType::Buy,
        })
    }
}

/// Summarizes with a running total kept in memory; good enough for tests,
/// nowhere near the real PnL/win-rate math.
#[derive(Default)]
pub struct InMemoryIndicatorStats {
    running_volume: Mutex<f64>,
}

#[async_trait]
impl IndicatorStats for InMemoryIndicatorStats {
    async fn summarize(
        &self,
        trade: &TradeEvent,
        update: &WalletPositionUpdate,
    ) -> (WalletSummary, WalletTransaction) {
        let mut running = self.running_volume.lock().expect("poisoned");
        *running += trade.volume_usd;

        let summary = WalletSummary {
            network: trade.network.clone(),
            wallet: trade.wallet.clone(),
            token: trade.base_token.clone(),
            realized_pnl_usd: update.new_holding - update.prev_holding,
            win_rate: if *running > 0.0 { 1.0 } else { 0.0 },
            updated_at: trade.event_time,
        };
        let transaction = WalletTransaction {
            network: trade.network.clone(),
            wallet: trade.wallet.clone(),
            token: trade.base_token.clone(),
            tx_type: update.tx_type,
            volume_usd: trade.volume_usd,
            event_time: trade.event_time,
        };
        (summary, transaction)
    }
}

/// Looks symbols up in a fixed in-memory map, `None` otherwise.
pub struct StaticTokenCatalog {
    known: std::collections::HashMap<String, TokenInfo>,
}

impl StaticTokenCatalog {
    pub fn new(known: impl IntoIterator<Item = (String, TokenInfo)>) -> Self {
        Self {
            known: known.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TokenCatalog for StaticTokenCatalog {
    async fn lookup(&self, _chain: &str, token_address: &str) -> Option<TokenInfo> {
        self.known.get(token_address).cloned()
    }
}

/// Every wallet in a fixed set is watched; everyone else isn't.
pub struct FixedWatchedWalletSet {
    wallets: HashSet<String>,
}

impl FixedWatchedWalletSet {
    pub fn new(wallets: impl IntoIterator<Item = String>) -> Self {
        Self {
            wallets: wallets.into_iter().collect(),
        }
    }
}

impl WatchedWalletSet for FixedWatchedWalletSet {
    fn is_watched(&self, wallet: &str) -> bool {
        self.wallets.contains(wallet)
    }
}
