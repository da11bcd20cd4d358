//! Process wiring for the `chainpulse-worker` daemon: config → logger →
//! metrics exporter → store clients → readers → dispatchers/worker pools →
//! batch writers → leaderboard aggregator, then block on OS signals.
//!
//! The domain rule engine (wallet-position analysis, indicator math, token
//! catalog lookups, watchlists) is out of this crate's scope per the data
//! model — [`chainpulse::handlers::testing`] supplies minimal reference
//! implementations that keep the daemon runnable end to end; swap them for
//! the real collaborators by constructing [`chainpulse::handlers::TradeHandler`]
//! / [`chainpulse::handlers::BalanceHandler`] with your own trait impls.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;

use chainpulse::batch::{AsyncBatchWriter, BatchWriterConfig};
use chainpulse::config::AppConfig;
use chainpulse::dispatch::{DispatcherConfig, ShardedDispatcher};
use chainpulse::handlers::testing::{
    FixedSmartMoneyAnalyzer, FixedWatchedWalletSet, InMemoryIndicatorStats, StaticTokenCatalog,
};
use chainpulse::handlers::{BalanceHandler, TradeHandler};
use chainpulse::ingest::{BalanceMessageHandler, RateLimitedReader, ReaderConfig, TradeMessageHandler};
use chainpulse::leaderboard::{ExternalCache, LeaderboardAggregator, LeaderboardConfig, RedisCache};
use chainpulse::sinks::{PostgresSink, SearchConfig, SearchSink, SelectDbSink, SelectDbConfig as SinkSelectDbConfig};
use chainpulse::{metrics, shutdown};

/// Per-record-type batch tuning. `AppConfig` only exposes `worker.worker_num`
/// (dispatcher shard count) per the external-interfaces contract; these
/// mirror the scale implied by the testable-properties scenarios.
const RELATIONAL_BATCH_SIZE: usize = 500;
const RELATIONAL_FLUSH_INTERVAL: Duration = Duration::from_secs(2);
const RELATIONAL_SHARD_COUNT: usize = 4;

const ANALYTICAL_BATCH_SIZE: usize = 1000;
const ANALYTICAL_FLUSH_INTERVAL: Duration = Duration::from_secs(3);
const ANALYTICAL_SHARD_COUNT: usize = 2;
const ANALYTICAL_TABLE: &str = "balance";

const SEARCH_BATCH_SIZE: usize = 500;
const SEARCH_FLUSH_INTERVAL: Duration = Duration::from_secs(2);
const SEARCH_SHARD_COUNT: usize = 2;

const TRADE_QUEUE_CAPACITY: usize = 2000;
const BALANCE_QUEUE_CAPACITY: usize = 200;

const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

#[derive(Debug)]
struct BootError(String);

impl std::fmt::Display for BootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BootError {}

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fatal: failed to load configuration from {config_path}: {err}");
            std::process::exit(1);
        }
    };

    init_logger(&config.log.level);

    if let Err(err) = run(config, config_path).await {
        log::error!("fatal: {err}");
        std::process::exit(1);
    }
}

fn init_logger(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new().filter_level(filter).init();
}

async fn run(config: AppConfig, config_path: String) -> Result<(), BootError> {
    let cancel = shutdown::root_token();

    if config.monitor.enable {
        metrics::install_exporter(config.monitor.prometheus_addr)
            .map_err(|e| BootError(format!("metrics exporter: {e}")))?;
        log::info!("prometheus exporter listening on {}", config.monitor.prometheus_addr);
    }

    tokio::spawn(chainpulse::config::watch_log_level(config_path, cancel.clone()));
    tokio::spawn(shutdown::trigger_on_signal(cancel.clone()));

    let redis_client =
        redis::Client::open(config.redis.address.clone()).map_err(|e| BootError(format!("redis client: {e}")))?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .map_err(|e| BootError(format!("redis connect: {e}")))?;
    let cache: Arc<dyn ExternalCache> = Arc::new(RedisCache::new(redis_conn));

    let pg_pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&config.postgres.dsn)
        .await
        .map_err(|e| BootError(format!("postgres connect: {e}")))?;

    let http_client = Client::builder().build().map_err(|e| BootError(format!("http client: {e}")))?;

    let relational_writer = Arc::new(AsyncBatchWriter::new(
        BatchWriterConfig {
            name: "relational".to_string(),
            batch_size: RELATIONAL_BATCH_SIZE,
            flush_interval: RELATIONAL_FLUSH_INTERVAL,
            shard_count: RELATIONAL_SHARD_COUNT,
        },
        Arc::new(PostgresSink::new(pg_pool, "relational")),
        cancel.clone(),
    ));
    relational_writer.start().await;

    let analytical_writer = Arc::new(AsyncBatchWriter::new(
        BatchWriterConfig {
            name: "analytical".to_string(),
            batch_size: ANALYTICAL_BATCH_SIZE,
            flush_interval: ANALYTICAL_FLUSH_INTERVAL,
            shard_count: ANALYTICAL_SHARD_COUNT,
        },
        Arc::new(SelectDbSink::new(
            http_client.clone(),
            SinkSelectDbConfig {
                base_url: config.selectdb.base_url.clone(),
                database: config.selectdb.database.clone(),
                table: ANALYTICAL_TABLE.to_string(),
                username: config.selectdb.username.clone(),
                password: config.selectdb.password.clone(),
            },
            "analytical",
        )),
        cancel.clone(),
    ));
    analytical_writer.start().await;

    let search_writer = if config.elasticsearch.addresses.is_empty() {
        log::info!("elasticsearch.addresses is empty, search-index sink disabled");
        None
    } else {
        let writer = Arc::new(AsyncBatchWriter::new(
            BatchWriterConfig {
                name: "search".to_string(),
                batch_size: SEARCH_BATCH_SIZE,
                flush_interval: SEARCH_FLUSH_INTERVAL,
                shard_count: SEARCH_SHARD_COUNT,
            },
            Arc::new(SearchSink::new(
                http_client.clone(),
                SearchConfig {
                    addresses: config.elasticsearch.addresses.clone(),
                    username: config.elasticsearch.username.clone(),
                    password: config.elasticsearch.password.clone(),
                    wallets_index_name: config.elasticsearch.wallets_index_name.clone(),
                    holdings_index_name: config.elasticsearch.holdings_index_name.clone(),
                },
                "search",
            )),
            cancel.clone(),
        ));
        writer.start().await;
        Some(writer)
    };

    let leaderboard = Arc::new(LeaderboardAggregator::new(
        LeaderboardConfig::default(),
        Arc::new(StaticTokenCatalog::new([])),
        cache,
    ));

    let mut trade_handler = TradeHandler::new(
        Arc::new(FixedSmartMoneyAnalyzer::new([])),
        Arc::new(InMemoryIndicatorStats::default()),
        relational_writer.clone(),
        leaderboard.clone(),
    );
    let mut balance_handler = BalanceHandler::new(
        analytical_writer.clone(),
        relational_writer.clone(),
        Arc::new(FixedWatchedWalletSet::new([])),
    );
    if let Some(search_writer) = &search_writer {
        trade_handler = trade_handler.with_search_writer(search_writer.clone());
        balance_handler = balance_handler.with_search_writer(search_writer.clone());
    }

    let trade_dispatcher = Arc::new(ShardedDispatcher::new(
        DispatcherConfig {
            name: "trade".to_string(),
            shard_count: config.worker.worker_num,
            queue_capacity: TRADE_QUEUE_CAPACITY,
            soft_backpressure: true,
        },
        Arc::new(trade_handler),
        cancel.clone(),
    ));
    trade_dispatcher.start().await;

    let balance_dispatcher = Arc::new(ShardedDispatcher::new(
        DispatcherConfig {
            name: "balance".to_string(),
            shard_count: config.worker.worker_num,
            queue_capacity: BALANCE_QUEUE_CAPACITY,
            soft_backpressure: false,
        },
        Arc::new(balance_handler),
        cancel.clone(),
    ));
    balance_dispatcher.start().await;

    let trade_message_handler = TradeMessageHandler::new(trade_dispatcher.clone());
    let balance_message_handler = BalanceMessageHandler::new(balance_dispatcher.clone());

    let trade_reader = RateLimitedReader::new(ReaderConfig {
        brokers: config.kafka.brokers.clone(),
        group_id: config.kafka.group_id.clone(),
        topic: config.kafka.topic_trade.clone(),
    })
    .map_err(|e| BootError(format!("trade reader: {e}")))?;
    let balance_reader = RateLimitedReader::new(ReaderConfig {
        brokers: config.kafka.brokers.clone(),
        group_id: config.kafka.group_id.clone(),
        topic: config.kafka.topic_balance.clone(),
    })
    .map_err(|e| BootError(format!("balance reader: {e}")))?;

    log::info!("chainpulse-worker started, worker_num={}", config.worker.worker_num);

    let (trade_result, balance_result) = tokio::join!(
        trade_reader.start(cancel.clone(), &trade_message_handler),
        balance_reader.start(cancel.clone(), &balance_message_handler),
    );
    if let Err(err) = trade_result {
        log::error!("trade reader exited: {err}");
    }
    if let Err(err) = balance_result {
        log::error!("balance reader exited: {err}");
    }

    // Readers have stopped (cancelled or fatal); drain dispatchers, then
    // writers, in that order, per the cancellation contract.
    cancel.cancel();
    trade_dispatcher.shutdown().await;
    balance_dispatcher.shutdown().await;
    relational_writer.close().await;
    analytical_writer.close().await;
    if let Some(search_writer) = search_writer {
        search_writer.close().await;
    }

    log::info!("chainpulse-worker shut down cleanly");
    Ok(())
}
