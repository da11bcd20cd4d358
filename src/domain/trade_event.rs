use serde::{Deserialize, Serialize};

/// Events older than this, relative to wall clock, are discarded at ingest.
pub const STALE_AFTER_SECS: i64 = 24 * 60 * 60;

/// Events with a smaller USD volume than this are discarded at ingest.
pub const MIN_VOLUME_USD: f64 = 0.01;

/// The type tag the bus uses for trade events; anything else is discarded.
const TRADE_TYPE_TAG: &str = "trade";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Buy,
    Sell,
}

/// A decoded trade event from the `trade` topic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeEvent {
    pub network: String,
    pub wallet: String,
    pub base_token: String,
    pub quote_token: String,
    pub volume_usd: f64,
    /// Unix seconds.
    pub event_time: i64,
    #[serde(rename = "type")]
    pub type_tag: String,
}

impl TradeEvent {
    /// The routing key used by the dispatcher and, later, the batch writer.
    pub fn routing_key(&self) -> String {
        format!("{}:{}:{}", self.network, self.wallet, self.base_token)
    }

    /// True once the event is too old to act on.
    pub fn is_stale(&self, now_unix: i64) -> bool {
        now_unix.saturating_sub(self.event_time) > STALE_AFTER_SECS
    }

    pub fn is_dust(&self) -> bool {
        self.volume_usd < MIN_VOLUME_USD
    }

    pub fn is_trade_tag(&self) -> bool {
        self.type_tag == TRADE_TYPE_TAG
    }

    /// Applies the three ingest-time invariants from the data model in one
    /// place so every caller filters consistently.
    pub fn passes_ingest_filters(&self, now_unix: i64) -> bool {
        self.is_trade_tag() && !self.is_stale(now_unix) && !self.is_dust()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(event_time: i64, volume_usd: f64, type_tag: &str) -> TradeEvent {
        TradeEvent {
            network: "BSC".to_string(),
            wallet: "0xwallet".to_string(),
            base_token: "0xbase".to_string(),
            quote_token: "0xquote".to_string(),
            volume_usd,
            event_time,
            type_tag: type_tag.to_string(),
        }
    }

    #[test]
    fn routing_key_is_network_wallet_token() {
        let e = sample(0, 1.0, "trade");
        assert_eq!(e.routing_key(), "BSC:0xwallet:0xbase");
    }

    #[test]
    fn stale_event_is_filtered() {
        let now = 100_000;
        let e = sample(now - STALE_AFTER_SECS - 1, 1.0, "trade");
        assert!(e.is_stale(now));
        assert!(!e.passes_ingest_filters(now));
    }

    #[test]
    fn dust_volume_is_filtered() {
        let e = sample(0, 0.001, "trade");
        assert!(e.is_dust());
        assert!(!e.passes_ingest_filters(1));
    }

    #[test]
    fn non_trade_tag_is_filtered() {
        let e = sample(0, 5.0, "balance");
        assert!(!e.is_trade_tag());
        assert!(!e.passes_ingest_filters(1));
    }

    #[test]
    fn well_formed_trade_passes() {
        let e = sample(1_000, 5.0, "trade");
        assert!(e.passes_ingest_filters(1_000));
    }
}
