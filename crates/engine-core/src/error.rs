use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Failed to create status directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Status directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode checkpoint: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Checkpoint task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Checkpoint belongs to another source: {field} is '{stored}', configured '{configured}'")]
    IdentityMismatch {
        field: &'static str,
        stored: String,
        configured: String,
    },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Downstream channel is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Batch rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
