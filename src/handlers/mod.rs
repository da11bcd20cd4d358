//! Domain handlers: the glue between a dispatched event and the batch
//! writers / leaderboard. Business logic (position analysis, indicator
//! math, token metadata, watchlists) is delegated to external collaborator
//! traits; see [`testing`] for minimal stand-ins used in unit tests.

mod balance;
mod trade;
mod traits;

pub mod testing;

pub use balance::BalanceHandler;
pub use trade::TradeHandler;
pub use traits::{IndicatorStats, WalletPositionAnalyzer, WalletPositionUpdate, WatchedWalletSet};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::batch::{AsyncBatchWriter, BatchWriterConfig, Sink, SinkError};
    use crate::dispatch::DomainHandler;
    use crate::domain::{BalanceDelta, BalanceEvent, DerivedRecord, TradeEvent};
    use crate::leaderboard::{LeaderboardAggregator, LeaderboardConfig};

    use super::testing::*;
    use super::*;

    struct CollectingSink {
        items: tokio::sync::Mutex<Vec<DerivedRecord>>,
    }

    #[async_trait::async_trait]
    impl Sink<DerivedRecord> for CollectingSink {
        async fn write(&self, batch: &[DerivedRecord]) -> Result<(), SinkError> {
            self.items.lock().await.extend_from_slice(batch);
            Ok(())
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    fn writer(sink: Arc<CollectingSink>) -> Arc<AsyncBatchWriter<DerivedRecord>> {
        Arc::new(AsyncBatchWriter::new(
            BatchWriterConfig {
                name: "test".to_string(),
                batch_size: 100,
                flush_interval: Duration::from_millis(20),
                shard_count: 1,
            },
            sink,
            CancellationToken::new(),
        ))
    }

    fn sample_trade(wallet: &str) -> TradeEvent {
        TradeEvent {
            network: "BSC".to_string(),
            wallet: wallet.to_string(),
            base_token: "0xbase".to_string(),
            quote_token: "0xquote".to_string(),
            volume_usd: 100.0,
            event_time: chrono::Utc::now().timestamp(),
            type_tag: "trade".to_string(),
        }
    }

    #[tokio::test]
    async fn smart_money_buy_writes_rows_and_updates_leaderboard() {
        let sink = Arc::new(CollectingSink {
            items: tokio::sync::Mutex::new(Vec::new()),
        });
        let relational = writer(sink.clone());
        relational.start().await;

        let leaderboard = Arc::new(LeaderboardAggregator::new(
            LeaderboardConfig::default(),
            Arc::new(testing_support::NullTokenCatalog),
            testing_support::fake_cache(),
        ));

        let handler = TradeHandler::new(
            Arc::new(FixedSmartMoneyAnalyzer::new(["0xsmart".to_string()])),
            Arc::new(InMemoryIndicatorStats::default()),
            relational.clone(),
            leaderboard,
        );

        handler.handle(sample_trade("0xsmart")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let items = sink.items.lock().await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|r| matches!(r, DerivedRecord::WalletSummary(_))));
        assert!(items.iter().any(|r| matches!(r, DerivedRecord::WalletTransaction(_))));

        relational.close().await;
    }

    #[tokio::test]
    async fn watched_wallet_balance_fans_out_to_both_writers() {
        let analytical_sink = Arc::new(CollectingSink {
            items: tokio::sync::Mutex::new(Vec::new()),
        });
        let relational_sink = Arc::new(CollectingSink {
            items: tokio::sync::Mutex::new(Vec::new()),
        });
        let analytical = writer(analytical_sink.clone());
        let relational = writer(relational_sink.clone());
        analytical.start().await;
        relational.start().await;

        let handler = BalanceHandler::new(
            analytical.clone(),
            relational.clone(),
            Arc::new(FixedWatchedWalletSet::new(["0xwatched".to_string()])),
        );

        let event = BalanceEvent {
            block_hash: "0xhash".to_string(),
            block_number: 1,
            network: "BSC".to_string(),
            event_time: chrono::Utc::now().timestamp(),
            deltas: vec![BalanceDelta {
                wallet: "0xwatched".to_string(),
                token_address: "0xtoken".to_string(),
                token_account: "0xaccount".to_string(),
                amount: "1.0".to_string(),
                decimals: 18,
            }],
        };

        handler.handle(event).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(analytical_sink.items.lock().await.len(), 1);
        assert_eq!(relational_sink.items.lock().await.len(), 1);

        analytical.close().await;
        relational.close().await;
    }

    #[tokio::test]
    async fn search_writer_is_optional_and_additive() {
        let sink = Arc::new(CollectingSink {
            items: tokio::sync::Mutex::new(Vec::new()),
        });
        let search_sink = Arc::new(CollectingSink {
            items: tokio::sync::Mutex::new(Vec::new()),
        });
        let relational = writer(sink.clone());
        let search = writer(search_sink.clone());
        relational.start().await;
        search.start().await;

        let leaderboard = Arc::new(LeaderboardAggregator::new(
            LeaderboardConfig::default(),
            Arc::new(testing_support::NullTokenCatalog),
            testing_support::fake_cache(),
        ));

        let handler = TradeHandler::new(
            Arc::new(FixedSmartMoneyAnalyzer::new(["0xsmart".to_string()])),
            Arc::new(InMemoryIndicatorStats::default()),
            relational.clone(),
            leaderboard,
        )
        .with_search_writer(search.clone());

        handler.handle(sample_trade("0xsmart")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Relational still gets both rows; search only gets the summary.
        assert_eq!(sink.items.lock().await.len(), 2);
        assert_eq!(search_sink.items.lock().await.len(), 1);
        assert!(matches!(
            search_sink.items.lock().await[0],
            DerivedRecord::WalletSummary(_)
        ));

        relational.close().await;
        search.close().await;
    }
}
