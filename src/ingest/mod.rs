//! Rate-limited Kafka consumption. One [`RateLimitedReader`] per topic,
//! each driving a [`MessageHandler`] that decodes and dispatches.

mod decode;
mod handler;
mod reader;

pub use decode::{BalanceMessageHandler, TradeMessageHandler};
pub use handler::MessageHandler;
pub use reader::{ReaderConfig, ReaderError, RateLimitedReader};
