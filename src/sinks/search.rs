use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::batch::{Sink, SinkError};
use crate::domain::DerivedRecord;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub addresses: Vec<String>,
    pub username: String,
    pub password: String,
    pub wallets_index_name: String,
    pub holdings_index_name: String,
}

/// Optional search-index sink: bulk upsert keyed by wallet address against
/// the search cluster's `_bulk` endpoint. Routes `WalletSummary` rows to
/// the wallets index and `Balance` rows to the holdings index; transaction
/// rows aren't indexed here.
pub struct SearchSink {
    client: Client,
    config: SearchConfig,
    name: String,
}

impl SearchSink {
    pub fn new(client: Client, config: SearchConfig, name: impl Into<String>) -> Self {
        Self {
            client,
            config,
            name: name.into(),
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .addresses
            .first()
            .map(String::as_str)
            .unwrap_or("http://localhost:9200")
    }
}

#[async_trait]
impl Sink<DerivedRecord> for SearchSink {
    async fn write(&self, batch: &[DerivedRecord]) -> Result<(), SinkError> {
        let mut ndjson = String::new();

        for record in batch {
            let (index, id, doc) = match record {
                DerivedRecord::WalletSummary(s) => (
                    &self.config.wallets_index_name,
                    format!("{}:{}:{}", s.network, s.wallet, s.token),
                    json!({
                        "network": s.network,
                        "wallet": s.wallet,
                        "token": s.token,
                        "realized_pnl_usd": s.realized_pnl_usd,
                        "win_rate": s.win_rate,
                        "updated_at": s.updated_at,
                    }),
                ),
                DerivedRecord::Balance(b) => (
                    &self.config.holdings_index_name,
                    format!("{}:{}:{}", b.network, b.wallet, b.token_address),
                    json!({
                        "network": b.network,
                        "wallet": b.wallet,
                        "token_address": b.token_address,
                        "amount": b.amount,
                        "decimals": b.decimals,
                        "event_time": b.event_time,
                    }),
                ),
                DerivedRecord::WalletTransaction(_) => continue,
            };

            ndjson.push_str(&json!({"index": {"_index": index, "_id": id}}).to_string());
            ndjson.push('\n');
            ndjson.push_str(&doc.to_string());
            ndjson.push('\n');
        }

        if ndjson.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url()))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Content-Type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Backend(format!("bulk index returned HTTP {}", response.status())));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
