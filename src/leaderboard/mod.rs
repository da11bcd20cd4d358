//! Redis-backed "who's buying what" leaderboard, updated synchronously
//! from the trade handler whenever a smart-money wallet buys.

mod aggregator;
mod blocklist;
mod cache;
mod redis_cache;
mod traits;

#[cfg(test)]
pub mod testing;

pub use aggregator::{LeaderboardAggregator, LeaderboardConfig, LeaderboardWindow};
pub use blocklist::TokenBlocklist;
pub use cache::{CacheError, ExternalCache};
pub use redis_cache::RedisCache;
pub use traits::{TokenCatalog, TokenInfo};
