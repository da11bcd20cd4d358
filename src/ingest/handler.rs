use async_trait::async_trait;

/// Invoked once per message read from a topic. Implementations decode the
/// payload and hand it to a [`crate::dispatch::ShardedDispatcher`] with a
/// non-blocking send — this contract is what lets [`super::RateLimitedReader`]
/// call it synchronously in its read loop without risking an indefinite
/// stall.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]);
}
