use connectors::error::AdapterError;
use engine_config::settings::error::ConfigError;
use engine_processing::error::PollError;
use thiserror::Error;

/// Errors raised while starting or stopping a poller.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open data source session: {0}")]
    Session(#[from] AdapterError),

    #[error("Poller error: {0}")]
    Poll(#[from] PollError),

    /// The worker task panicked or was aborted.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
