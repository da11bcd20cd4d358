//! An in-memory stand-in for [`super::ExternalCache`], good enough to
//! exercise the aggregator's window/ranking logic in tests without a real
//! Redis instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::cache::{CacheError, ExternalCache};

#[derive(Default)]
pub struct InMemoryCache {
    zsets: Mutex<HashMap<String, Vec<(String, f64)>>>,
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    strings: Mutex<HashMap<String, String>>,
}

pub fn in_memory_cache() -> Arc<dyn ExternalCache> {
    Arc::new(InMemoryCache::default())
}

#[async_trait]
impl ExternalCache for InMemoryCache {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CacheError> {
        let mut zsets = self.zsets.lock().expect("poisoned");
        let set = zsets.entry(key.to_string()).or_default();
        if let Some(entry) = set.iter_mut().find(|(m, _)| m == member) {
            entry.1 = score;
        } else {
            set.push((member.to_string(), score));
        }
        Ok(())
    }

    async fn zremrangebyscore(&self, key: &str, max_score: f64) -> Result<(), CacheError> {
        let mut zsets = self.zsets.lock().expect("poisoned");
        if let Some(set) = zsets.get_mut(key) {
            set.retain(|(_, score)| *score > max_score);
        }
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<i64, CacheError> {
        let zsets = self.zsets.lock().expect("poisoned");
        Ok(zsets.get(key).map(|s| s.len()).unwrap_or(0) as i64)
    }

    async fn zremrangebyrank_keep_top(&self, key: &str, keep: isize) -> Result<(), CacheError> {
        let mut zsets = self.zsets.lock().expect("poisoned");
        if let Some(set) = zsets.get_mut(key) {
            set.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            let keep = keep.max(0) as usize;
            if set.len() > keep {
                let drop_count = set.len() - keep;
                set.drain(0..drop_count);
            }
        }
        Ok(())
    }

    async fn zrevrange_with_scores(&self, key: &str, count: isize) -> Result<Vec<(String, f64)>, CacheError> {
        let zsets = self.zsets.lock().expect("poisoned");
        let mut set = zsets.get(key).cloned().unwrap_or_default();
        set.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        set.truncate(count.max(0) as usize);
        Ok(set)
    }

    async fn expire(&self, _key: &str, _ttl_secs: i64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<(), CacheError> {
        let mut hashes = self.hashes.lock().expect("poisoned");
        let hash = hashes.entry(key.to_string()).or_default();
        let current: i64 = hash.get(field).and_then(|v| v.parse().ok()).unwrap_or(0);
        hash.insert(field.to_string(), (current + delta).to_string());
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
        let hashes = self.hashes.lock().expect("poisoned");
        Ok(hashes.get(key).cloned().unwrap_or_default())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, _ttl_secs: i64) -> Result<(), CacheError> {
        let mut strings = self.strings.lock().expect("poisoned");
        strings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
