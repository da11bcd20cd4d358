use std::num::NonZeroU32;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use metrics::counter;
use nonzero_ext::nonzero;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use tokio_util::sync::CancellationToken;

use crate::metrics::labels::TOPIC;

use super::handler::MessageHandler;

/// Tunables fixed per the data model; only broker list, group id and topic
/// name come from configuration.
const QUEUE_CAPACITY: &str = "2000";
const MIN_BYTES: &str = "1024";
const MAX_BYTES: &str = "10000000";
const READ_DEADLINE: Duration = Duration::from_secs(2);
const OFFSET_COMMIT_INTERVAL: Duration = Duration::from_secs(5);
const RATE_LIMIT_PER_SEC: NonZeroU32 = nonzero!(3000u32);
const RATE_LIMIT_BURST: NonZeroU32 = nonzero!(3000u32);

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
}

#[derive(Debug)]
pub enum ReaderError {
    Config(rdkafka::error::KafkaError),
    Fatal(String),
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::Config(e) => write!(f, "kafka config error: {e}"),
            ReaderError::Fatal(e) => write!(f, "fatal consumer error: {e}"),
        }
    }
}

impl std::error::Error for ReaderError {}

/// A single-topic consumer loop, token-bucket rate limited, that hands each
/// message to a [`MessageHandler`] without blocking on downstream work.
pub struct RateLimitedReader {
    config: ReaderConfig,
    consumer: StreamConsumer,
    limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl RateLimitedReader {
    pub fn new(config: ReaderConfig) -> Result<Self, ReaderError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .set("fetch.min.bytes", MIN_BYTES)
            .set("fetch.message.max.bytes", MAX_BYTES)
            .set("queued.max.messages.kbytes", QUEUE_CAPACITY)
            .set("topic.metadata.refresh.interval.ms", "5000")
            .create()
            .map_err(ReaderError::Config)?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(ReaderError::Config)?;

        let quota = Quota::per_second(RATE_LIMIT_PER_SEC).allow_burst(RATE_LIMIT_BURST);

        Ok(Self {
            config,
            consumer,
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Runs until `cancel` fires or a fatal broker/consumer error occurs.
    pub async fn start(&self, cancel: CancellationToken, handler: &dyn MessageHandler) -> Result<(), ReaderError> {
        let mut last_commit = tokio::time::Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("reader for topic {} cancelled", self.config.topic);
                    return Ok(());
                }
                _ = self.acquire_token(&cancel) => {}
            }

            if cancel.is_cancelled() {
                return Ok(());
            }

            match tokio::time::timeout(READ_DEADLINE, self.consumer.recv()).await {
                Ok(Ok(message)) => {
                    counter!("messages_received", TOPIC => self.config.topic.clone()).increment(1);
                    if let Some(payload) = message.payload() {
                        handler.handle(payload).await;
                    }
                }
                Ok(Err(err)) if is_fatal(&err) => {
                    return Err(ReaderError::Fatal(err.to_string()));
                }
                Ok(Err(err)) => {
                    log::warn!("reader for topic {} read error: {err}", self.config.topic);
                }
                Err(_elapsed) => {
                    log::debug!("reader for topic {} read deadline exceeded", self.config.topic);
                }
            }

            if last_commit.elapsed() >= OFFSET_COMMIT_INTERVAL {
                if let Err(err) = self.consumer.commit_consumer_state(CommitMode::Async) {
                    log::warn!("reader for topic {} offset commit failed: {err}", self.config.topic);
                }
                last_commit = tokio::time::Instant::now();
            }
        }
    }

    async fn acquire_token(&self, cancel: &CancellationToken) {
        tokio::select! {
            _ = self.limiter.until_ready() => {}
            _ = cancel.cancelled() => {}
        }
    }
}

fn is_fatal(err: &rdkafka::error::KafkaError) -> bool {
    matches!(
        err,
        rdkafka::error::KafkaError::ConsumerCommit(_)
            | rdkafka::error::KafkaError::ClientCreation(_)
            | rdkafka::error::KafkaError::Global(rdkafka::types::RDKafkaErrorCode::Fatal)
    )
}
