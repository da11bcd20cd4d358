use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

use crate::batch::{Sink, SinkError};
use crate::domain::DerivedRecord;

/// Batched row insert into the relational store. No schema migration is
/// asserted here beyond column-set correspondence with [`DerivedRecord`]'s
/// three variants; each gets its own table.
pub struct PostgresSink {
    pool: PgPool,
    name: String,
}

impl PostgresSink {
    pub fn new(pool: PgPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Sink<DerivedRecord> for PostgresSink {
    async fn write(&self, batch: &[DerivedRecord]) -> Result<(), SinkError> {
        let summaries: Vec<_> = batch
            .iter()
            .filter_map(|r| match r {
                DerivedRecord::WalletSummary(s) => Some(s),
                _ => None,
            })
            .collect();
        let transactions: Vec<_> = batch
            .iter()
            .filter_map(|r| match r {
                DerivedRecord::WalletTransaction(t) => Some(t),
                _ => None,
            })
            .collect();
        let balances: Vec<_> = batch
            .iter()
            .filter_map(|r| match r {
                DerivedRecord::Balance(b) => Some(b),
                _ => None,
            })
            .collect();

        if !summaries.is_empty() {
            let mut builder = QueryBuilder::new(
                "INSERT INTO wallet_summary (network, wallet, token, realized_pnl_usd, win_rate, updated_at) ",
            );
            builder.push_values(summaries, |mut row, s| {
                row.push_bind(&s.network)
                    .push_bind(&s.wallet)
                    .push_bind(&s.token)
                    .push_bind(s.realized_pnl_usd)
                    .push_bind(s.win_rate)
                    .push_bind(s.updated_at);
            });
            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| SinkError::Backend(e.to_string()))?;
        }

        if !transactions.is_empty() {
            let mut builder = QueryBuilder::new(
                "INSERT INTO wallet_transaction (network, wallet, token, tx_type, volume_usd, event_time) ",
            );
            builder.push_values(transactions, |mut row, t| {
                row.push_bind(&t.network)
                    .push_bind(&t.wallet)
                    .push_bind(&t.token)
                    .push_bind(tx_type_label(t.tx_type))
                    .push_bind(t.volume_usd)
                    .push_bind(t.event_time);
            });
            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| SinkError::Backend(e.to_string()))?;
        }

        if !balances.is_empty() {
            let mut builder = QueryBuilder::new(
                "INSERT INTO balance (network, wallet, token_address, token_account, amount, decimals, block_number, event_time) ",
            );
            builder.push_values(balances, |mut row, b| {
                row.push_bind(&b.network)
                    .push_bind(&b.wallet)
                    .push_bind(&b.token_address)
                    .push_bind(&b.token_account)
                    .push_bind(&b.amount)
                    .push_bind(b.decimals as i16)
                    .push_bind(b.block_number as i64)
                    .push_bind(b.event_time);
            });
            builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| SinkError::Backend(e.to_string()))?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn tx_type_label(tx_type: crate::domain::TxType) -> &'static str {
    match tx_type {
        crate::domain::TxType::Buy => "buy",
        crate::domain::TxType::Sell => "sell",
    }
}
