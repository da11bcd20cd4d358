use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::TxType;

use super::blocklist::TokenBlocklist;
use super::cache::ExternalCache;
use super::traits::TokenCatalog;

const LEADERBOARD_TOP_N: isize = 200;
const LEADERBOARD_TTL_DAYS: i64 = 7;
const TOP_DETAIL_COUNT: isize = 10;
const AGGREGATION_DEADLINE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardWindow {
    pub label: &'static str,
    pub seconds: i64,
}

#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    pub windows: Vec<LeaderboardWindow>,
    pub blocklist: TokenBlocklist,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            windows: vec![
                LeaderboardWindow { label: "1h", seconds: 3_600 },
                LeaderboardWindow { label: "6h", seconds: 21_600 },
                LeaderboardWindow { label: "24h", seconds: 86_400 },
            ],
            blocklist: TokenBlocklist::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TopCardDetail {
    symbol: String,
    logo: String,
    price: f64,
    change_percent: f64,
    buy_txns: i64,
    sell_txns: i64,
}

/// Maintains a Redis-backed "who's buying what" leaderboard per chain and
/// time window, called synchronously from the trade handler after a wallet
/// is classified as smart money.
pub struct LeaderboardAggregator {
    config: LeaderboardConfig,
    token_catalog: Arc<dyn TokenCatalog>,
    cache: Arc<dyn ExternalCache>,
}

impl LeaderboardAggregator {
    pub fn new(config: LeaderboardConfig, token_catalog: Arc<dyn TokenCatalog>, cache: Arc<dyn ExternalCache>) -> Self {
        Self {
            config,
            token_catalog,
            cache,
        }
    }

    pub async fn record_event(&self, chain: &str, token_address: &str, wallet: &str, event_timestamp: i64, tx_type: TxType) {
        if tx_type != TxType::Buy || self.config.blocklist.contains(token_address) {
            return;
        }

        let outcome = tokio::time::timeout(
            AGGREGATION_DEADLINE,
            self.aggregate_all_windows(chain, token_address, wallet, event_timestamp),
        )
        .await;

        if outcome.is_err() {
            log::warn!("leaderboard aggregation for {chain}/{token_address} exceeded {AGGREGATION_DEADLINE:?}, aborting");
        }
    }

    async fn aggregate_all_windows(&self, chain: &str, token_address: &str, wallet: &str, event_timestamp: i64) {
        for window in &self.config.windows {
            if let Err(err) = self
                .aggregate_one_window(chain, token_address, wallet, event_timestamp, *window)
                .await
            {
                log::warn!("leaderboard window {} aggregation failed: {err}", window.label);
            }
        }
    }

    async fn aggregate_one_window(
        &self,
        chain: &str,
        token_address: &str,
        wallet: &str,
        event_timestamp: i64,
        window: LeaderboardWindow,
    ) -> Result<(), super::cache::CacheError> {
        let wallets_key = format!("top_cards:{chain}:{token_address}:{}:wallets", window.label);
        let stats_key = format!("top_cards:{chain}:{token_address}:{}:stats", window.label);
        let leaderboard_key = format!("top_cards:{chain}:{}:leaderboard", window.label);

        // 1. wallet set maintenance
        self.cache.zadd(&wallets_key, wallet, event_timestamp as f64).await?;
        self.cache
            .zremrangebyscore(&wallets_key, (event_timestamp - window.seconds) as f64)
            .await?;
        self.cache.expire(&wallets_key, window.seconds).await?;

        // 2. per-direction counters (gate already restricts this to buys)
        self.cache.hincrby(&stats_key, "buy_txns", 1).await?;
        self.cache.expire(&stats_key, window.seconds).await?;

        // 3. leaderboard update
        let wallet_count = self.cache.zcard(&wallets_key).await?;
        self.cache
            .zadd(&leaderboard_key, token_address, wallet_count as f64)
            .await?;
        self.cache
            .zremrangebyrank_keep_top(&leaderboard_key, LEADERBOARD_TOP_N)
            .await?;
        self.cache
            .expire(&leaderboard_key, LEADERBOARD_TTL_DAYS * 86_400)
            .await?;

        // 4. top-10 detail refresh
        let top = self.cache.zrevrange_with_scores(&leaderboard_key, TOP_DETAIL_COUNT).await?;
        for (token, _score) in top {
            let detail_stats_key = format!("top_cards:{chain}:{token}:{}:stats", window.label);
            let stats = self.cache.hgetall(&detail_stats_key).await?;
            let buy_txns = stats.get("buy_txns").and_then(|v| v.parse().ok()).unwrap_or(0);
            let sell_txns = stats.get("sell_txns").and_then(|v| v.parse().ok()).unwrap_or(0);

            let (symbol, logo) = match self.token_catalog.lookup(chain, &token).await {
                Some(info) => (info.symbol, info.logo),
                None => (String::new(), String::new()),
            };

            let detail = TopCardDetail {
                symbol,
                logo,
                price: 0.0,
                change_percent: 0.0,
                buy_txns,
                sell_txns,
            };
            let detail_key = format!("top_cards:{chain}:{token}:{}:detail", window.label);
            if let Ok(serialized) = serde_json::to_string(&detail) {
                self.cache.set_with_ttl(&detail_key, &serialized, window.seconds).await?;
            }
        }

        Ok(())
    }
}
