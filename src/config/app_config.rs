use std::net::SocketAddr;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub group_id: String,
    pub topic_trade: String,
    pub topic_balance: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub address: String,
    pub db: u8,
    pub db_metrics: u8,
    pub db_price: u8,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    pub dsn: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectDbConfig {
    pub dsn: String,
    pub base_url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ElasticsearchConfig {
    pub addresses: Vec<String>,
    pub username: String,
    pub password: String,
    pub holdings_index_name: String,
    pub wallets_index_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    pub worker_num: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    pub enable: bool,
    pub prometheus_addr: SocketAddr,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MoralisConfig {
    pub base_url: String,
    pub gateway_url: String,
    pub api_key: String,
    pub rate_limit: u32,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log: LogConfig,
    pub kafka: KafkaConfig,
    pub redis: RedisConfig,
    pub postgres: PostgresConfig,
    pub selectdb: SelectDbConfig,
    pub elasticsearch: ElasticsearchConfig,
    pub worker: WorkerConfig,
    pub monitor: MonitorConfig,
    pub moralis: MoralisConfig,
    pub bsc_client_rawurl: String,
    pub solana_client_rawurl: String,
    pub byd_rpc_url: String,
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Layers a TOML file under `ENV`-prefixed environment overrides. Parse
    /// failure here is fatal at boot, per the data model.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CHAINPULSE_").split("__"))
            .extract()
            .map_err(|e| ConfigError(e.to_string()))
    }
}
