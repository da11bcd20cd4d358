//! Process-wide metric definitions.
//!
//! Every counter/histogram/gauge named in the data model is registered once
//! at startup (see [`install_exporter`]) and recorded through the `metrics`
//! facade macros elsewhere in the crate. This module exists so the label
//! strings and metric names live in exactly one place.

use std::net::SocketAddr;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Registers descriptions for every metric the core emits and binds the
/// Prometheus HTTP exporter at `addr`. Call once from `main`, only when
/// `monitor.enable` is true.
pub fn install_exporter(addr: SocketAddr) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    let handle = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!("messages_received", "Messages pulled off a topic, per topic");
    describe_counter!("worker_dispatched", "Events handed to a worker-pool shard");
    describe_counter!("worker_processed", "Events a worker-pool shard finished processing");
    describe_histogram!("worker_process_seconds", "Seconds spent in one worker invocation");

    describe_counter!("async_queued", "Items accepted into a batch writer's shard queue");
    describe_counter!("async_dropped", "Items dropped because a batch writer's shard queue was full");
    describe_histogram!("async_batch_size", "Size of a flushed batch");
    describe_counter!("async_flush_count", "Flushes performed by a batch writer");
    describe_histogram!("async_flush_seconds", "Seconds spent inside one sink write");
    describe_counter!("async_items_written", "Items successfully handed to a sink");
    describe_counter!(
        "async_dropped_by_sink",
        "Items dropped after exhausting the single retry against a failing sink"
    );

    describe_gauge!("balance_delay_seconds", "now_unix - event_time for the last balance delta seen per network");
}

/// Labels shared by the batch-writer metrics; kept in one place so a typo in
/// a label name can't silently fragment a series.
pub mod labels {
    pub const TOPIC: &str = "topic";
    pub const WORKER_ID: &str = "worker_id";
    pub const WRITER: &str = "writer";
    pub const NETWORK: &str = "network";
}
