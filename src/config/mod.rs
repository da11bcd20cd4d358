//! Layered configuration: a single TOML file overridden by
//! `CHAINPULSE_`-prefixed environment variables (double underscore as the
//! nesting separator, e.g. `CHAINPULSE_KAFKA__BROKERS`), deserialized into
//! the typed sections enumerated in the external-interfaces contract.
//!
//! Only `log.level` is hot-reloaded after boot ([`watch_log_level`]);
//! every other section, `worker.worker_num` in particular, is bound once
//! at process start and never touched again.

mod app_config;
mod hot_reload;

pub use app_config::{
    AppConfig, ConfigError, ElasticsearchConfig, KafkaConfig, LogConfig, MonitorConfig,
    MoralisConfig, PostgresConfig, RedisConfig, SelectDbConfig, WorkerConfig,
};
pub use hot_reload::watch_log_level;
