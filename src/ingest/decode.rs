use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::ShardedDispatcher;
use crate::domain::{BalanceEvent, TradeEvent};

use super::handler::MessageHandler;

/// Decodes a trade-topic payload and forwards events that pass the
/// ingest-time filters (stale / dust / wrong type tag) to the dispatcher.
/// This is the production [`MessageHandler`]; it is what lets
/// [`super::RateLimitedReader`] stay byte-transparent per the data model.
pub struct TradeMessageHandler {
    dispatcher: Arc<ShardedDispatcher<TradeEvent>>,
}

impl TradeMessageHandler {
    pub fn new(dispatcher: Arc<ShardedDispatcher<TradeEvent>>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageHandler for TradeMessageHandler {
    async fn handle(&self, payload: &[u8]) {
        let event: TradeEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("trade message decode failed: {err}");
                return;
            }
        };

        let now = chrono::Utc::now().timestamp();
        if !event.passes_ingest_filters(now) {
            return;
        }

        self.dispatcher.dispatch(event).await;
    }
}

/// Decodes a balance-topic payload and forwards non-no-op events to the
/// dispatcher.
pub struct BalanceMessageHandler {
    dispatcher: Arc<ShardedDispatcher<BalanceEvent>>,
}

impl BalanceMessageHandler {
    pub fn new(dispatcher: Arc<ShardedDispatcher<BalanceEvent>>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageHandler for BalanceMessageHandler {
    async fn handle(&self, payload: &[u8]) {
        let event: BalanceEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("balance message decode failed: {err}");
                return;
            }
        };

        if event.is_noop() {
            return;
        }

        self.dispatcher.dispatch(event).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait as _async_trait;
    use tokio::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    use crate::dispatch::{DispatcherConfig, DomainHandler};

    use super::*;

    struct RecordingHandler<E> {
        seen: Mutex<Vec<E>>,
    }

    #[_async_trait]
    impl DomainHandler<TradeEvent> for RecordingHandler<TradeEvent> {
        async fn handle(&self, event: TradeEvent) {
            self.seen.lock().await.push(event);
        }
    }

    #[_async_trait]
    impl DomainHandler<BalanceEvent> for RecordingHandler<BalanceEvent> {
        async fn handle(&self, event: BalanceEvent) {
            self.seen.lock().await.push(event);
        }
    }

    fn trade_dispatcher(
        handler: Arc<RecordingHandler<TradeEvent>>,
    ) -> Arc<ShardedDispatcher<TradeEvent>> {
        Arc::new(ShardedDispatcher::new(
            DispatcherConfig {
                name: "trade".to_string(),
                shard_count: 1,
                queue_capacity: 100,
                soft_backpressure: false,
            },
            handler,
            CancellationToken::new(),
        ))
    }

    fn balance_dispatcher(
        handler: Arc<RecordingHandler<BalanceEvent>>,
    ) -> Arc<ShardedDispatcher<BalanceEvent>> {
        Arc::new(ShardedDispatcher::new(
            DispatcherConfig {
                name: "balance".to_string(),
                shard_count: 1,
                queue_capacity: 100,
                soft_backpressure: false,
            },
            handler,
            CancellationToken::new(),
        ))
    }

    #[tokio::test]
    async fn well_formed_trade_is_dispatched() {
        let recorder = Arc::new(RecordingHandler { seen: Mutex::new(Vec::new()) });
        let dispatcher = trade_dispatcher(recorder.clone());
        dispatcher.start().await;
        let handler = TradeMessageHandler::new(dispatcher.clone());

        let payload = serde_json::json!({
            "network": "BSC",
            "wallet": "0xwallet",
            "base_token": "0xbase",
            "quote_token": "0xquote",
            "volume_usd": 10.0,
            "event_time": chrono::Utc::now().timestamp(),
            "type": "trade",
        });
        handler.handle(payload.to_string().as_bytes()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(recorder.seen.lock().await.len(), 1);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn stale_trade_is_dropped_before_dispatch() {
        let recorder = Arc::new(RecordingHandler { seen: Mutex::new(Vec::new()) });
        let dispatcher = trade_dispatcher(recorder.clone());
        dispatcher.start().await;
        let handler = TradeMessageHandler::new(dispatcher.clone());

        let stale_time = chrono::Utc::now().timestamp() - 25 * 60 * 60;
        let payload = serde_json::json!({
            "network": "BSC",
            "wallet": "0xwallet",
            "base_token": "0xbase",
            "quote_token": "0xquote",
            "volume_usd": 10.0,
            "event_time": stale_time,
            "type": "trade",
        });
        handler.handle(payload.to_string().as_bytes()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(recorder.seen.lock().await.is_empty());
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped_without_panic() {
        let recorder = Arc::new(RecordingHandler { seen: Mutex::new(Vec::new()) });
        let dispatcher = trade_dispatcher(recorder.clone());
        dispatcher.start().await;
        let handler = TradeMessageHandler::new(dispatcher.clone());

        handler.handle(b"not json").await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(recorder.seen.lock().await.is_empty());
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn noop_balance_event_is_not_dispatched() {
        let recorder = Arc::new(RecordingHandler { seen: Mutex::new(Vec::new()) });
        let dispatcher = balance_dispatcher(recorder.clone());
        dispatcher.start().await;
        let handler = BalanceMessageHandler::new(dispatcher.clone());

        let payload = serde_json::json!({
            "block_hash": "",
            "block_number": 1,
            "network": "BSC",
            "event_time": chrono::Utc::now().timestamp(),
            "deltas": [],
        });
        handler.handle(payload.to_string().as_bytes()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(recorder.seen.lock().await.is_empty());
        dispatcher.shutdown().await;
    }
}
