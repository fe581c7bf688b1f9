use crate::query::{QueryBuildError, dialect::Dialect};
use model::{
    pagination::cursor::{Cursor, CursorError, CursorMode},
    records::row::RowData,
};

pub trait OffsetStrategy: Send + Sync {
    /// Appends the cursor predicate, ordering and limit to a base SELECT.
    fn apply_to_query(
        &self,
        base: &str,
        cursor: &Cursor,
        limit: usize,
        dialect: Dialect,
    ) -> Result<String, QueryBuildError>;

    /// Cursor to resume from once `rows` have been delivered.
    ///
    /// `None` means the rows carry no usable position and the cursor stays put.
    fn next_cursor(&self, rows: &[RowData], current: &Cursor)
    -> Result<Option<Cursor>, CursorError>;

    /// Clones the boxed trait object.
    fn clone_box(&self) -> Box<dyn OffsetStrategy>;
}

/// `WHERE col > cursor ORDER BY col ASC`, cursor taken from the last row.
pub struct IncrementalOffset {
    pub col: String,
}

/// Plain `LIMIT/OFFSET` paging where the cursor counts rows already read.
pub struct RowOffset;

impl OffsetStrategy for IncrementalOffset {
    fn apply_to_query(
        &self,
        base: &str,
        cursor: &Cursor,
        limit: usize,
        dialect: Dialect,
    ) -> Result<String, QueryBuildError> {
        Ok(format!(
            "{base} WHERE {col} > {val} ORDER BY {col} ASC LIMIT {limit}",
            col = self.col,
            val = dialect.string_literal(cursor.value()),
        ))
    }

    fn next_cursor(
        &self,
        rows: &[RowData],
        _current: &Cursor,
    ) -> Result<Option<Cursor>, CursorError> {
        // rows without a value for the column cannot move the cursor
        Ok(rows
            .iter()
            .rev()
            .find_map(|row| row.get_value(&self.col).to_text())
            .map(Cursor::from))
    }

    fn clone_box(&self) -> Box<dyn OffsetStrategy> {
        Box::new(IncrementalOffset {
            col: self.col.clone(),
        })
    }
}

impl OffsetStrategy for RowOffset {
    fn apply_to_query(
        &self,
        base: &str,
        cursor: &Cursor,
        limit: usize,
        _dialect: Dialect,
    ) -> Result<String, QueryBuildError> {
        let offset = cursor.as_offset()?;
        Ok(format!("{base} LIMIT {limit} OFFSET {offset}"))
    }

    fn next_cursor(
        &self,
        rows: &[RowData],
        current: &Cursor,
    ) -> Result<Option<Cursor>, CursorError> {
        if rows.is_empty() {
            return Ok(None);
        }
        current.advance_offset(rows.len()).map(Some)
    }

    fn clone_box(&self) -> Box<dyn OffsetStrategy> {
        Box::new(RowOffset)
    }
}

pub fn strategy_from_mode(mode: &CursorMode) -> Box<dyn OffsetStrategy> {
    match mode {
        CursorMode::Incremental { column } => Box::new(IncrementalOffset {
            col: column.clone(),
        }),
        CursorMode::RowOffset => Box::new(RowOffset),
    }
}
