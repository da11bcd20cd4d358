use serde::{Deserialize, Serialize};

/// One balance change inside a [`BalanceEvent`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalanceDelta {
    pub wallet: String,
    pub token_address: String,
    pub token_account: String,
    /// Decimal string, preserved verbatim — the core never does arithmetic
    /// on it, only the downstream indicator math (external) does.
    pub amount: String,
    pub decimals: u8,
}

/// A decoded balance event from the `balance` topic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalanceEvent {
    pub block_hash: String,
    pub block_number: u64,
    pub network: String,
    /// Unix seconds.
    pub event_time: i64,
    pub deltas: Vec<BalanceDelta>,
}

impl BalanceEvent {
    /// An empty delta list or an empty hash is a no-op per the data model.
    pub fn is_noop(&self) -> bool {
        self.block_hash.is_empty() || self.deltas.is_empty()
    }

    /// Coarse routing key used for the analytical writer (keeps networks
    /// isolated from each other without fragmenting further).
    pub fn network_bucket_key(&self) -> String {
        format!("network:{}", self.network)
    }

    /// Fine routing key used for the relational writer, one shard lane per
    /// block so per-event ordering within a block is preserved.
    pub fn hash_index_key(&self) -> String {
        format!("hash:{}", self.block_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta() -> BalanceDelta {
        BalanceDelta {
            wallet: "0xwallet".to_string(),
            token_address: "0xtoken".to_string(),
            token_account: "0xaccount".to_string(),
            amount: "123.456".to_string(),
            decimals: 18,
        }
    }

    #[test]
    fn empty_deltas_is_noop() {
        let e = BalanceEvent {
            block_hash: "0xhash".to_string(),
            block_number: 1,
            network: "BSC".to_string(),
            event_time: 0,
            deltas: vec![],
        };
        assert!(e.is_noop());
    }

    #[test]
    fn empty_hash_is_noop() {
        let e = BalanceEvent {
            block_hash: String::new(),
            block_number: 1,
            network: "BSC".to_string(),
            event_time: 0,
            deltas: vec![delta()],
        };
        assert!(e.is_noop());
    }

    #[test]
    fn populated_event_is_not_noop() {
        let e = BalanceEvent {
            block_hash: "0xhash".to_string(),
            block_number: 1,
            network: "BSC".to_string(),
            event_time: 0,
            deltas: vec![delta()],
        };
        assert!(!e.is_noop());
        assert_eq!(e.network_bucket_key(), "network:BSC");
        assert_eq!(e.hash_index_key(), "hash:0xhash");
    }
}
