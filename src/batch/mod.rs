//! Generic sharded batch writer: bounded queue, size/time flush, pluggable
//! sink. This is the one piece every domain handler and sink adapter shares.

mod sink;
mod writer;

pub use sink::{Sink, SinkError};
pub use writer::{AsyncBatchWriter, BatchWriterConfig};
