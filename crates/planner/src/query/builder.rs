use crate::query::{
    QueryBuildError,
    dialect::Dialect,
    offsets::{OffsetStrategy, strategy_from_mode},
};
use model::pagination::cursor::{Cursor, CursorMode};

/// Placeholder in a custom query that is replaced by the quoted cursor value.
pub const CURSOR_PLACEHOLDER: &str = "$@$";

/// Produces the SQL text for each poll.
pub struct QueryBuilder {
    base: String,
    custom: bool,
    max_rows: usize,
    dialect: Dialect,
    offset: Box<dyn OffsetStrategy>,
}

impl QueryBuilder {
    /// Auto-generated `SELECT <columns> FROM <table>`.
    pub fn select(columns: &str, table: &str, mode: &CursorMode, max_rows: usize) -> Self {
        Self {
            base: format!("SELECT {columns} FROM {table}"),
            custom: false,
            max_rows,
            dialect: Dialect::default(),
            offset: strategy_from_mode(mode),
        }
    }

    /// User-supplied query, kept verbatim.
    pub fn custom(query: &str, incremental_column: &str, max_rows: usize) -> Self {
        Self {
            base: query.to_string(),
            custom: true,
            max_rows,
            dialect: Dialect::default(),
            offset: strategy_from_mode(&CursorMode::Incremental {
                column: incremental_column.to_string(),
            }),
        }
    }

    /// Literal escaping used when the cursor is spliced into the SQL.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// The query as configured, before any cursor is applied.
    pub fn query(&self) -> &str {
        &self.base
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn offset_strategy(&self) -> &dyn OffsetStrategy {
        self.offset.as_ref()
    }

    /// SQL to execute for the given cursor.
    ///
    /// Custom queries only get the cursor where they ask for it through
    /// [`CURSOR_PLACEHOLDER`]; otherwise they run unmodified.
    pub fn build(&self, cursor: &Cursor) -> Result<String, QueryBuildError> {
        if self.custom {
            return Ok(self
                .base
                .replace(CURSOR_PLACEHOLDER, &self.dialect.string_literal(cursor.value())));
        }
        self.offset
            .apply_to_query(&self.base, cursor, self.max_rows, self.dialect)
    }
}

impl Clone for QueryBuilder {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            custom: self.custom,
            max_rows: self.max_rows,
            dialect: self.dialect,
            offset: self.offset.clone_box(),
        }
    }
}
