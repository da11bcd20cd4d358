use async_trait::async_trait;

/// Where a flushed batch ends up. One implementation per external store;
/// see [`crate::sinks`] for the concrete adapters.
#[async_trait]
pub trait Sink<T>: Send + Sync {
    async fn write(&self, batch: &[T]) -> Result<(), SinkError>;

    /// Name used in metric labels and log lines. Defaults to the type name,
    /// but sinks should override it with something stable.
    fn name(&self) -> &str;
}

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Backend(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "io error: {e}"),
            SinkError::Serialization(e) => write!(f, "serialization error: {e}"),
            SinkError::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}
