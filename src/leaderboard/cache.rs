use std::collections::HashMap;

use async_trait::async_trait;

#[derive(Debug)]
pub enum CacheError {
    Backend(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Backend(e) => write!(f, "cache backend error: {e}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// The sorted-set/hash/string operations the leaderboard needs from the
/// external cache. Narrow on purpose: the core owns key schema and window
/// semantics, not the cache client.
#[async_trait]
pub trait ExternalCache: Send + Sync {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CacheError>;
    async fn zremrangebyscore(&self, key: &str, max_score: f64) -> Result<(), CacheError>;
    async fn zcard(&self, key: &str) -> Result<i64, CacheError>;
    async fn zremrangebyrank_keep_top(&self, key: &str, keep: isize) -> Result<(), CacheError>;
    async fn zrevrange_with_scores(&self, key: &str, count: isize) -> Result<Vec<(String, f64)>, CacheError>;
    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<(), CacheError>;
    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<(), CacheError>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, CacheError>;
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: i64) -> Result<(), CacheError>;
}
