use model::pagination::cursor::CursorError;
use thiserror::Error;

pub mod builder;
pub mod dialect;
pub mod offsets;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("Invalid cursor: {0}")]
    Cursor(#[from] CursorError),
}
