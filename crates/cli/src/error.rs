use connectors::error::AdapterError;
use engine_config::settings::error::ConfigError;
use engine_core::error::CheckpointError;
use engine_runtime::error::RuntimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to run the poller: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Connection failed: {0}")]
    Connection(#[from] AdapterError),

    #[error("Failed to read checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Ping failed: {0}")]
    Ping(String),
}
