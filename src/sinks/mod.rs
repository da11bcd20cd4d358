//! Concrete [`crate::batch::Sink`] adapters: thin wiring to the actual
//! store clients. The algorithmic core (batching, retry, backpressure)
//! lives entirely in [`crate::batch`]; these just know how to serialize a
//! batch and make one network call.

mod postgres;
mod search;
mod selectdb;

pub use postgres::PostgresSink;
pub use search::{SearchConfig, SearchSink};
pub use selectdb::{SelectDbConfig, SelectDbSink};
