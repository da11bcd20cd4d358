use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::cache::{CacheError, ExternalCache};

/// The production [`ExternalCache`], backed by a shared
/// [`redis::aio::ConnectionManager`] (handles reconnects transparently, so
/// the leaderboard doesn't need its own retry loop around individual
/// commands).
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ExternalCache for RedisCache {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CacheError> {
        self.conn
            .clone()
            .zadd::<_, _, _, ()>(key, member, score)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn zremrangebyscore(&self, key: &str, max_score: f64) -> Result<(), CacheError> {
        self.conn
            .clone()
            .zrembyscore::<_, _, _, ()>(key, f64::NEG_INFINITY, max_score)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn zcard(&self, key: &str) -> Result<i64, CacheError> {
        self.conn
            .clone()
            .zcard(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn zremrangebyrank_keep_top(&self, key: &str, keep: isize) -> Result<(), CacheError> {
        self.conn
            .clone()
            .zremrangebyrank::<_, ()>(key, 0, -(keep + 1))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn zrevrange_with_scores(&self, key: &str, count: isize) -> Result<Vec<(String, f64)>, CacheError> {
        self.conn
            .clone()
            .zrevrange_withscores(key, 0, count - 1)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<(), CacheError> {
        self.conn
            .clone()
            .expire::<_, ()>(key, ttl_secs)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<(), CacheError> {
        self.conn
            .clone()
            .hincr::<_, _, _, ()>(key, field, delta)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
        self.conn
            .clone()
            .hgetall(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: i64) -> Result<(), CacheError> {
        self.conn
            .clone()
            .set_ex::<_, _, ()>(key, value, ttl_secs as u64)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
