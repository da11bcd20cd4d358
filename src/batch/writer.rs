use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::labels::WRITER;
use crate::routing::shard_for;

use super::sink::Sink;

#[derive(Debug, Clone)]
pub struct BatchWriterConfig {
    pub name: String,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub shard_count: usize,
}

/// Generic bounded-queue, time-and-size-flushed, multi-shard batch writer.
///
/// Each shard is owned by exactly one task once [`AsyncBatchWriter::start`]
/// runs; the channel is the only thing producers and that task share.
pub struct AsyncBatchWriter<T: Send + 'static> {
    config: BatchWriterConfig,
    sink: Arc<dyn Sink<T>>,
    cancel: CancellationToken,
    senders: Vec<mpsc::Sender<T>>,
    receivers: AsyncMutex<Vec<Option<mpsc::Receiver<T>>>>,
    handles: AsyncMutex<Vec<JoinHandle<()>>>,
    last_dropped_log: Vec<AtomicI64>,
}

impl<T: Send + 'static> AsyncBatchWriter<T> {
    pub fn new(config: BatchWriterConfig, sink: Arc<dyn Sink<T>>, cancel: CancellationToken) -> Self {
        let capacity = config.batch_size * 2;
        let mut senders = Vec::with_capacity(config.shard_count);
        let mut receivers = Vec::with_capacity(config.shard_count);
        for _ in 0..config.shard_count {
            let (tx, rx) = mpsc::channel(capacity);
            senders.push(tx);
            receivers.push(Some(rx));
        }
        let last_dropped_log = (0..config.shard_count).map(|_| AtomicI64::new(0)).collect();

        Self {
            config,
            sink,
            cancel,
            senders,
            receivers: AsyncMutex::new(receivers),
            handles: AsyncMutex::new(Vec::new()),
            last_dropped_log,
        }
    }

    fn shard_index(&self, routing_key: &str) -> usize {
        shard_for(routing_key, self.config.shard_count)
    }

    /// Non-blocking submit. Drops and counts on a full queue; never errors.
    pub fn submit(&self, item: T, routing_key: &str) {
        let shard = self.shard_index(routing_key);
        match self.senders[shard].try_send(item) {
            Ok(()) => {
                counter!("async_queued", WRITER => self.config.name.clone()).increment(1);
            }
            Err(mpsc::error::TrySendError::Full(_)) | Err(mpsc::error::TrySendError::Closed(_)) => {
                counter!("async_dropped", WRITER => self.config.name.clone()).increment(1);
                self.log_dropped_rate_limited(shard);
            }
        }
    }

    /// Blocking submit: waits for queue space or cancellation. Caller owns
    /// the resulting backpressure.
    pub async fn must_submit(&self, item: T, routing_key: &str) {
        let shard = self.shard_index(routing_key);
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            result = self.senders[shard].send(item) => {
                if result.is_ok() {
                    counter!("async_queued", WRITER => self.config.name.clone()).increment(1);
                }
            }
        }
    }

    /// Logs at most once per second per shard, regardless of drop volume.
    fn log_dropped_rate_limited(&self, shard: usize) {
        let last = &self.last_dropped_log[shard];
        let now = chrono::Utc::now().timestamp();
        let prev = last.load(Ordering::Relaxed);
        if now > prev {
            last.store(now, Ordering::Relaxed);
            log::warn!(
                "writer {} shard {} dropping items, queue full",
                self.config.name,
                shard
            );
        }
    }

    /// Spawns one owner task per shard.
    pub async fn start(self: &Arc<Self>) {
        let mut receivers = self.receivers.lock().await;
        let mut handles = self.handles.lock().await;
        for shard in 0..self.config.shard_count {
            let rx = receivers[shard].take().expect("start() called twice");
            let writer = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                writer.run_shard(shard, rx).await;
            }));
        }
    }

    /// Signals cancellation and waits for every shard's final flush.
    pub async fn close(&self) {
        self.cancel.cancel();
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(err) = handle.await {
                log::error!("writer {} shard task panicked: {err}", self.config.name);
            }
        }
    }

    async fn run_shard(&self, shard: usize, mut rx: mpsc::Receiver<T>) {
        let mut accumulator: Vec<T> = Vec::with_capacity(self.config.batch_size);
        let mut ticker = tokio::time::interval(self.config.flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut retry_batch: Option<Vec<T>> = None;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    rx.close();
                    while let Ok(item) = rx.try_recv() {
                        accumulator.push(item);
                    }
                    if let Some(batch) = retry_batch.take() {
                        self.flush(shard, batch, true).await;
                    }
                    if !accumulator.is_empty() {
                        self.flush(shard, std::mem::take(&mut accumulator), false).await;
                    }
                    return;
                }

                maybe_item = rx.recv() => {
                    match maybe_item {
                        Some(item) => {
                            accumulator.push(item);
                            if accumulator.len() >= self.config.batch_size {
                                let batch = std::mem::replace(&mut accumulator, Vec::with_capacity(self.config.batch_size));
                                if let Some(failed) = self.flush(shard, batch, false).await {
                                    retry_batch = Some(failed);
                                }
                            }
                        }
                        None => {
                            log::info!("writer {} shard {} queue closed", self.config.name, shard);
                            if !accumulator.is_empty() {
                                self.flush(shard, std::mem::take(&mut accumulator), false).await;
                            }
                            return;
                        }
                    }
                }

                _ = ticker.tick() => {
                    if let Some(batch) = retry_batch.take() {
                        self.flush(shard, batch, true).await;
                    } else if !accumulator.is_empty() {
                        let batch = std::mem::replace(&mut accumulator, Vec::with_capacity(self.config.batch_size));
                        if let Some(failed) = self.flush(shard, batch, false).await {
                            retry_batch = Some(failed);
                        }
                    }
                }
            }
        }
    }

    /// Writes `batch` to the sink. Returns `Some(batch)` when the write
    /// failed on its first attempt and should be retried at the next tick;
    /// returns `None` on success or after a retry has already failed once.
    async fn flush(&self, shard: usize, batch: Vec<T>, is_retry: bool) -> Option<Vec<T>> {
        if batch.is_empty() {
            return None;
        }
        let start = Instant::now();
        let len = batch.len();
        match self.sink.write(&batch).await {
            Ok(()) => {
                let elapsed = start.elapsed().as_secs_f64();
                histogram!("async_batch_size", WRITER => self.config.name.clone()).record(len as f64);
                histogram!("async_flush_seconds", WRITER => self.config.name.clone()).record(elapsed);
                counter!("async_flush_count", WRITER => self.config.name.clone()).increment(1);
                counter!("async_items_written", WRITER => self.config.name.clone()).increment(len as u64);
                None
            }
            Err(err) if is_retry => {
                log::error!(
                    "writer {} shard {} dropping batch of {len} after retry failure: {err}",
                    self.config.name,
                    shard,
                );
                counter!("async_dropped_by_sink", WRITER => self.config.name.clone())
                    .increment(len as u64);
                None
            }
            Err(err) => {
                log::warn!(
                    "writer {} shard {} sink write failed, retrying next tick: {err}",
                    self.config.name,
                    shard
                );
                Some(batch)
            }
        }
    }
}
