use std::sync::Arc;

use async_trait::async_trait;

use crate::batch::AsyncBatchWriter;
use crate::dispatch::DomainHandler;
use crate::domain::{DerivedRecord, TradeEvent, TxType};
use crate::leaderboard::LeaderboardAggregator;

use super::traits::{IndicatorStats, WalletPositionAnalyzer};

/// Turns a qualifying trade into at most one wallet-summary row and one
/// transaction row, and feeds the leaderboard when the wallet is smart
/// money buying.
pub struct TradeHandler {
    analyzer: Arc<dyn WalletPositionAnalyzer>,
    indicators: Arc<dyn IndicatorStats>,
    relational_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
    leaderboard: Arc<LeaderboardAggregator>,
    /// Optional search-index fan-out (§4.8's "optional sink"); `None`
    /// leaves wallet-summary rows relational-only.
    search_writer: Option<Arc<AsyncBatchWriter<DerivedRecord>>>,
}

impl TradeHandler {
    pub fn new(
        analyzer: Arc<dyn WalletPositionAnalyzer>,
        indicators: Arc<dyn IndicatorStats>,
        relational_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
        leaderboard: Arc<LeaderboardAggregator>,
    ) -> Self {
        Self {
            analyzer,
            indicators,
            relational_writer,
            leaderboard,
            search_writer: None,
        }
    }

    /// Adds the optional search-index writer. Wallet-summary rows are
    /// additionally submitted there under the same routing key.
    pub fn with_search_writer(mut self, search_writer: Arc<AsyncBatchWriter<DerivedRecord>>) -> Self {
        self.search_writer = Some(search_writer);
        self
    }
}

#[async_trait]
impl DomainHandler<TradeEvent> for TradeHandler {
    async fn handle(&self, trade: TradeEvent) {
        let Some(update) = self.analyzer.analyze(&trade).await else {
            return;
        };

        let (summary, transaction) = self.indicators.summarize(&trade, &update).await;
        let routing_key = trade.routing_key();
        if let Some(search_writer) = &self.search_writer {
            search_writer.submit(DerivedRecord::WalletSummary(summary.clone()), &routing_key);
        }
        self.relational_writer
            .submit(DerivedRecord::WalletSummary(summary), &routing_key);
        self.relational_writer
            .submit(DerivedRecord::WalletTransaction(transaction), &routing_key);

        if update.smart_money && update.tx_type == TxType::Buy {
            self.leaderboard
                .record_event(
                    &trade.network,
                    &trade.base_token,
                    &trade.wallet,
                    trade.event_time,
                    update.tx_type,
                )
                .await;
        }
    }
}
