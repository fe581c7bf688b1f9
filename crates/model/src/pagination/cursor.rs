use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Last-seen position along the incremental column, carried as text.
///
/// The value is never reinterpreted: numbers and timestamps are compared by
/// the source's own ordering once bound back into the query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Interprets the cursor as a row offset.
    pub fn as_offset(&self) -> Result<u64, CursorError> {
        self.0
            .trim()
            .parse::<u64>()
            .map_err(|_| CursorError::NotAnOffset(self.0.clone()))
    }

    /// Moves a row-offset cursor forward by `rows`.
    pub fn advance_offset(&self, rows: usize) -> Result<Cursor, CursorError> {
        let next = self.as_offset()?.saturating_add(rows as u64);
        Ok(Cursor(next.to_string()))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Cursor::new(value)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Cursor(value)
    }
}

/// How the cursor bounds the next query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum CursorMode {
    /// `WHERE column > cursor ORDER BY column`.
    Incremental { column: String },

    /// No incremental column: the cursor counts rows already read.
    RowOffset,
}

impl CursorMode {
    pub fn column(&self) -> Option<&str> {
        match self {
            CursorMode::Incremental { column } => Some(column),
            CursorMode::RowOffset => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Cursor value '{0}' is not a row offset")]
    NotAnOffset(String),
}
