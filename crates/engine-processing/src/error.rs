use connectors::sql::base::error::DbError;
use engine_core::error::{CheckpointError, SerializeError, SinkError};
use model::pagination::cursor::{Cursor, CursorError};
use planner::query::QueryBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Failed to restore checkpoint: {0}")]
    Restore(#[source] CheckpointError),

    #[error("Query failed at cursor {cursor}: {source}")]
    Query {
        cursor: Cursor,
        #[source]
        source: DbError,
    },

    #[error("Failed to build query: {0}")]
    Build(#[from] QueryBuildError),

    #[error("Invalid cursor: {0}")]
    Cursor(#[from] CursorError),

    #[error("Failed to encode event: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Failed to deliver batch '{batch_id}': {source}")]
    Deliver {
        batch_id: String,
        #[source]
        source: SinkError,
    },

    #[error("Failed to commit cursor {cursor}: {source}")]
    Commit {
        cursor: Cursor,
        #[source]
        source: CheckpointError,
    },

    #[error("Executor is stopped")]
    Stopped,
}
