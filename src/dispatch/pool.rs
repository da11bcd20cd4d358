use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::labels::WORKER_ID;
use crate::routing::shard_for;

use super::handler::{DomainHandler, RoutedEvent};

const SOFT_BACKPRESSURE_FILL_RATIO: f64 = 0.8;
const SOFT_BACKPRESSURE_SLEEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub name: String,
    pub shard_count: usize,
    pub queue_capacity: usize,
    /// Trade path only, per the data model: sleep 100ms before attempting
    /// send once a shard queue is 80% full.
    pub soft_backpressure: bool,
}

/// Routes events to per-shard bounded queues by CRC32 of the routing key,
/// and owns the worker-pool tasks that drain them.
pub struct ShardedDispatcher<E: RoutedEvent> {
    config: DispatcherConfig,
    handler: Arc<dyn DomainHandler<E>>,
    senders: Vec<mpsc::Sender<E>>,
    receivers: AsyncMutex<Vec<Option<mpsc::Receiver<E>>>>,
    handles: AsyncMutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl<E: RoutedEvent> ShardedDispatcher<E> {
    pub fn new(config: DispatcherConfig, handler: Arc<dyn DomainHandler<E>>, cancel: CancellationToken) -> Self {
        let mut senders = Vec::with_capacity(config.shard_count);
        let mut receivers = Vec::with_capacity(config.shard_count);
        for _ in 0..config.shard_count {
            let (tx, rx) = mpsc::channel(config.queue_capacity);
            senders.push(tx);
            receivers.push(Some(rx));
        }

        Self {
            config,
            handler,
            senders,
            receivers: AsyncMutex::new(receivers),
            handles: AsyncMutex::new(Vec::new()),
            cancel,
        }
    }

    /// Routes and sends one event. Non-blocking; drops on a full queue
    /// after the (trade-path-only) soft backpressure sleep.
    pub async fn dispatch(&self, event: E) {
        let shard = shard_for(&event.routing_key(), self.config.shard_count);
        let sender = &self.senders[shard];

        if self.config.soft_backpressure {
            let fill = 1.0 - (sender.capacity() as f64 / self.config.queue_capacity as f64);
            if fill >= SOFT_BACKPRESSURE_FILL_RATIO {
                tokio::time::sleep(SOFT_BACKPRESSURE_SLEEP).await;
            }
        }

        match sender.try_send(event) {
            Ok(()) => {
                counter!("worker_dispatched", WORKER_ID => self.worker_label(shard)).increment(1);
            }
            Err(_) => {
                log::warn!(
                    "dispatcher {} shard {shard} full, dropping event",
                    self.config.name
                );
                counter!("async_dropped", WORKER_ID => self.worker_label(shard)).increment(1);
            }
        }
    }

    fn worker_label(&self, shard: usize) -> String {
        format!("{}-{shard}", self.config.name)
    }

    /// Spawns one long-lived worker task per shard.
    pub async fn start(self: &Arc<Self>) {
        let mut receivers = self.receivers.lock().await;
        let mut handles = self.handles.lock().await;
        for shard in 0..self.config.shard_count {
            let rx = receivers[shard].take().expect("start() called twice");
            let pool = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                pool.run_worker(shard, rx).await;
            }));
        }
    }

    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(err) = handle.await {
                log::error!("dispatcher {} shard task panicked: {err}", self.config.name);
            }
        }
    }

    async fn run_worker(&self, shard: usize, mut rx: mpsc::Receiver<E>) {
        let label = self.worker_label(shard);
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return;
                }
                maybe_event = rx.recv() => {
                    match maybe_event {
                        Some(event) => {
                            let start = Instant::now();
                            self.handler.handle(event).await;
                            histogram!("worker_process_seconds", WORKER_ID => label.clone())
                                .record(start.elapsed().as_secs_f64());
                            counter!("worker_processed", WORKER_ID => label.clone()).increment(1);
                        }
                        None => {
                            log::info!("dispatcher {} shard {shard} queue closed", self.config.name);
                            return;
                        }
                    }
                }
            }
        }
    }
}
