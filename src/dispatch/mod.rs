//! Sharded dispatch: routes decoded events to per-shard queues by a stable
//! hash of a routing key, and runs the worker-pool tasks that drain them in
//! per-key order.

mod handler;
mod pool;

pub use handler::{DomainHandler, RoutedEvent};
pub use pool::{DispatcherConfig, ShardedDispatcher};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[derive(Clone)]
    struct Event {
        key: String,
        seq: u32,
    }

    impl RoutedEvent for Event {
        fn routing_key(&self) -> String {
            self.key.clone()
        }
    }

    struct RecordingHandler {
        seen: Mutex<Vec<u32>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DomainHandler<Event> for RecordingHandler {
        async fn handle(&self, event: Event) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().await.push(event.seq);
        }
    }

    #[tokio::test]
    async fn same_key_processed_in_order() {
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        let dispatcher = Arc::new(ShardedDispatcher::new(
            DispatcherConfig {
                name: "trades".to_string(),
                shard_count: 4,
                queue_capacity: 100,
                soft_backpressure: false,
            },
            handler.clone(),
            cancel.clone(),
        ));
        dispatcher.start().await;

        for seq in 0..20 {
            dispatcher
                .dispatch(Event {
                    key: "same-wallet".to_string(),
                    seq,
                })
                .await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let seen = handler.seen.lock().await;
        assert_eq!(seen.len(), 20);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        // A tiny queue that the worker never drains (handler sleeps) forces
        // drops once it fills.
        let dispatcher = Arc::new(ShardedDispatcher::new(
            DispatcherConfig {
                name: "trades".to_string(),
                shard_count: 1,
                queue_capacity: 2,
                soft_backpressure: false,
            },
            handler.clone(),
            cancel.clone(),
        ));

        for seq in 0..10 {
            dispatcher
                .dispatch(Event {
                    key: "k".to_string(),
                    seq,
                })
                .await;
        }

        // Never started: queue never drains, so most sends dropped.
        assert!(handler.calls.load(Ordering::SeqCst) == 0);
    }
}
