use crate::settings::{error::ConfigError, keys};
use connectors::sql::base::{adapter::DatabaseKind, settings::ConnectionSettings};
use engine_core::{
    serializer::EventFormat,
    state::{models::SourceIdentity, status_file::StatusFileStore},
};
use model::pagination::cursor::{Cursor, CursorMode};
use planner::query::{builder::QueryBuilder, dialect::Dialect};
use std::{path::PathBuf, time::Duration};

/// Immutable, validated poller configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub source_name: String,
    pub connection: ConnectionSettings,
    pub table: String,
    pub columns_to_select: String,
    pub custom_query: Option<String>,
    /// Column bounding each query; `None` selects row-offset paging.
    pub incremental_column: Option<String>,
    pub poll_delay: Duration,
    pub batch_size: usize,
    pub max_rows: usize,
    pub status_file_dir: PathBuf,
    pub status_file_name: String,
    pub initial_cursor: Cursor,
    pub event_format: EventFormat,
}

impl Configuration {
    pub fn from_builder(builder: ConfigurationBuilder) -> Result<Self, ConfigError> {
        let incremental_column = builder.incremental_column;
        if builder.custom_query.is_some() && incremental_column.is_none() {
            return Err(ConfigError::CustomQueryWithoutIncrementalColumn);
        }

        Ok(Self {
            source_name: builder.source_name,
            connection: builder
                .connection
                .ok_or(ConfigError::MissingRequired(keys::CONNECTION_URL))?,
            table: builder
                .table
                .ok_or(ConfigError::MissingRequired(keys::TABLE))?,
            columns_to_select: builder
                .columns_to_select
                .unwrap_or_else(|| keys::DEFAULT_COLUMNS_TO_SELECT.to_string()),
            custom_query: builder.custom_query,
            incremental_column,
            poll_delay: builder
                .poll_delay
                .unwrap_or(Duration::from_millis(keys::DEFAULT_RUN_QUERY_DELAY_MS)),
            batch_size: builder.batch_size.unwrap_or(keys::DEFAULT_BATCH_SIZE),
            max_rows: builder.max_rows.unwrap_or(keys::DEFAULT_MAX_ROWS),
            status_file_dir: builder
                .status_file_dir
                .unwrap_or_else(|| PathBuf::from(keys::DEFAULT_STATUS_FILE_PATH)),
            status_file_name: builder
                .status_file_name
                .ok_or(ConfigError::MissingRequired(keys::STATUS_FILE_NAME))?,
            initial_cursor: builder
                .initial_cursor
                .unwrap_or_else(|| Cursor::new(keys::DEFAULT_START_VALUE)),
            event_format: builder.event_format.unwrap_or_default(),
        })
    }

    pub fn cursor_mode(&self) -> CursorMode {
        match &self.incremental_column {
            Some(column) => CursorMode::Incremental {
                column: column.clone(),
            },
            None => CursorMode::RowOffset,
        }
    }

    pub fn status_file_path(&self) -> PathBuf {
        self.status_file_dir.join(&self.status_file_name)
    }

    pub fn status_store(&self) -> StatusFileStore {
        StatusFileStore::new(&self.status_file_dir, &self.status_file_name)
    }

    pub fn dialect(&self) -> Dialect {
        match self.connection.kind() {
            DatabaseKind::MySql => Dialect::MySql,
            _ => Dialect::Standard,
        }
    }

    pub fn query_builder(&self) -> QueryBuilder {
        let builder = match (&self.custom_query, &self.incremental_column) {
            (Some(query), Some(column)) => QueryBuilder::custom(query, column, self.max_rows),
            _ => QueryBuilder::select(
                &self.columns_to_select,
                &self.table,
                &self.cursor_mode(),
                self.max_rows,
            ),
        };
        builder.with_dialect(self.dialect())
    }

    pub fn identity(&self) -> SourceIdentity {
        SourceIdentity {
            source_name: self.source_name.clone(),
            url: self.connection.url.clone(),
            table: self.table.clone(),
            columns_to_select: self.columns_to_select.clone(),
            incremental_column: self.incremental_column.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    pub source_name: String,
    pub connection: Option<ConnectionSettings>,
    pub table: Option<String>,
    pub columns_to_select: Option<String>,
    pub custom_query: Option<String>,
    pub incremental_column: Option<String>,
    pub poll_delay: Option<Duration>,
    pub batch_size: Option<usize>,
    pub max_rows: Option<usize>,
    pub status_file_dir: Option<PathBuf>,
    pub status_file_name: Option<String>,
    pub initial_cursor: Option<Cursor>,
    pub event_format: Option<EventFormat>,
}

impl ConfigurationBuilder {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Default::default()
        }
    }

    pub fn connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn columns_to_select(mut self, columns: impl Into<String>) -> Self {
        self.columns_to_select = Some(columns.into());
        self
    }

    pub fn custom_query(mut self, query: impl Into<String>) -> Self {
        self.custom_query = Some(query.into());
        self
    }

    pub fn incremental_column(mut self, column: impl Into<String>) -> Self {
        self.incremental_column = Some(column.into());
        self
    }

    pub fn poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = Some(delay);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn status_file(mut self, dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.status_file_dir = Some(dir.into());
        self.status_file_name = Some(name.into());
        self
    }

    pub fn initial_cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.initial_cursor = Some(cursor.into());
        self
    }

    pub fn event_format(mut self, format: EventFormat) -> Self {
        self.event_format = Some(format);
        self
    }

    pub fn build(self) -> Result<Configuration, ConfigError> {
        Configuration::from_builder(self)
    }
}
