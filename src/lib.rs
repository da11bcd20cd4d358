//! Stream-processing core for on-chain trading and balance indicators.
//!
//! Three subsystems do the heavy lifting and everything else hangs off them:
//! ingestion ([`ingest`]) feeds a sharded dispatcher ([`dispatch`]), domain
//! handlers ([`handlers`]) turn events into derived records that an
//! [`batch`] writer flushes into pluggable [`sinks`], and trades classified
//! as smart money update the [`leaderboard`] aggregator.

pub mod batch;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod handlers;
pub mod ingest;
pub mod leaderboard;
pub mod metrics;
pub mod routing;
pub mod shutdown;
pub mod sinks;
