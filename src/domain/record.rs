use serde::{Deserialize, Serialize};

use super::TxType;

/// A per-wallet rollup of trading indicators, upserted on every qualifying
/// trade. The indicator values themselves are computed by an external
/// collaborator (see [`crate::handlers`]); this is just the row shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub network: String,
    pub wallet: String,
    pub token: String,
    pub realized_pnl_usd: f64,
    pub win_rate: f64,
    pub updated_at: i64,
}

/// One row per qualifying trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub network: String,
    pub wallet: String,
    pub token: String,
    pub tx_type: TxType,
    pub volume_usd: f64,
    pub event_time: i64,
}

/// One row per balance delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub network: String,
    pub wallet: String,
    pub token_address: String,
    pub token_account: String,
    pub amount: String,
    pub decimals: u8,
    pub block_number: u64,
    pub event_time: i64,
}

/// Any row the core hands to an [`crate::batch::AsyncBatchWriter`].
///
/// The routing key decides which shard (and therefore which in-order
/// lane) a record lands in; it has nothing to do with the sink's own
/// primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DerivedRecord {
    WalletSummary(WalletSummary),
    WalletTransaction(WalletTransaction),
    Balance(Balance),
}

impl DerivedRecord {
    pub fn routing_key(&self) -> String {
        match self {
            DerivedRecord::WalletSummary(r) => format!("{}:{}:{}", r.network, r.wallet, r.token),
            DerivedRecord::WalletTransaction(r) => {
                format!("{}:{}:{}", r.network, r.wallet, r.token)
            }
            DerivedRecord::Balance(r) => format!("{}:{}", r.network, r.wallet),
        }
    }
}
