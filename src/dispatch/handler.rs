use async_trait::async_trait;

use crate::domain::{BalanceEvent, TradeEvent};

/// Implemented by the type a [`super::ShardedDispatcher`] routes to. The
/// routing key decides which worker-pool shard (and therefore which
/// in-order lane) an event lands in.
pub trait RoutedEvent: Send + 'static {
    fn routing_key(&self) -> String;
}

impl RoutedEvent for TradeEvent {
    fn routing_key(&self) -> String {
        TradeEvent::routing_key(self)
    }
}

impl RoutedEvent for BalanceEvent {
    fn routing_key(&self) -> String {
        // Coarse enough to keep per-block ordering without fragmenting
        // further; the balance handler re-derives the fine-grained key
        // per delta when it writes to the relational sink.
        self.hash_index_key()
    }
}

/// One domain handler per event type (trade, balance, ...). Invoked by
/// exactly one worker-pool shard task at a time for any given shard.
#[async_trait]
pub trait DomainHandler<E>: Send + Sync {
    async fn handle(&self, event: E);
}
