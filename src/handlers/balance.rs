use std::sync::Arc;

use async_trait::async_trait;
use metrics::gauge;

use crate::batch::AsyncBatchWriter;
use crate::dispatch::DomainHandler;
use crate::domain::{Balance, BalanceEvent, DerivedRecord};
use crate::metrics::labels::NETWORK;

use super::traits::WatchedWalletSet;

/// Fans a balance event's deltas out to the analytical store (always,
/// coarse routing) and, for watched wallets, the relational store (fine
/// routing, one shard lane per block).
pub struct BalanceHandler {
    analytical_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
    relational_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
    watched: Arc<dyn WatchedWalletSet>,
    /// Optional search-index fan-out (§4.8's "optional sink"); `None`
    /// leaves holdings out of the search index entirely.
    search_writer: Option<Arc<AsyncBatchWriter<DerivedRecord>>>,
}

impl BalanceHandler {
    pub fn new(
        analytical_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
        relational_writer: Arc<AsyncBatchWriter<DerivedRecord>>,
        watched: Arc<dyn WatchedWalletSet>,
    ) -> Self {
        Self {
            analytical_writer,
            relational_writer,
            watched,
            search_writer: None,
        }
    }

    /// Adds the optional search-index writer. Every balance delta is
    /// additionally submitted there under the analytical (coarse) key.
    pub fn with_search_writer(mut self, search_writer: Arc<AsyncBatchWriter<DerivedRecord>>) -> Self {
        self.search_writer = Some(search_writer);
        self
    }
}

#[async_trait]
impl DomainHandler<BalanceEvent> for BalanceHandler {
    async fn handle(&self, event: BalanceEvent) {
        if event.is_noop() {
            return;
        }

        let now = chrono::Utc::now().timestamp();
        gauge!("balance_delay_seconds", NETWORK => event.network.clone())
            .set((now - event.event_time) as f64);

        let analytical_key = event.network_bucket_key();
        let relational_key = event.hash_index_key();

        for delta in &event.deltas {
            let balance = Balance {
                network: event.network.clone(),
                wallet: delta.wallet.clone(),
                token_address: delta.token_address.clone(),
                token_account: delta.token_account.clone(),
                amount: delta.amount.clone(),
                decimals: delta.decimals,
                block_number: event.block_number,
                event_time: event.event_time,
            };

            if let Some(search_writer) = &self.search_writer {
                search_writer.submit(DerivedRecord::Balance(balance.clone()), &analytical_key);
            }

            self.analytical_writer
                .submit(DerivedRecord::Balance(balance.clone()), &analytical_key);

            if self.watched.is_watched(&delta.wallet) {
                self.relational_writer
                    .submit(DerivedRecord::Balance(balance), &relational_key);
            }
        }
    }
}
