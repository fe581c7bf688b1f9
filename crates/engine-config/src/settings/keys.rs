//! Recognized configuration keys and their defaults.

pub const STATUS_FILE_NAME: &str = "status.file.name";
pub const STATUS_FILE_PATH: &str = "status.file.path";
pub const CONNECTION_URL: &str = "connection.url";
pub const LEGACY_CONNECTION_URL: &str = "hibernate.connection.url";
pub const TABLE: &str = "table";
pub const COLUMNS_TO_SELECT: &str = "columns.to.select";
pub const INCREMENTAL_COLUMN_NAME: &str = "incremental.column.name";
pub const INCREMENTAL_VALUE: &str = "incremental.value";
pub const START_FROM: &str = "start.from";
pub const RUN_QUERY_DELAY: &str = "run.query.delay";
pub const BATCH_SIZE: &str = "batch.size";
pub const MAX_ROWS: &str = "max.rows";
pub const CUSTOM_QUERY: &str = "custom.query";
pub const INCREMENTAL_COLUMN: &str = "incremental.column";
pub const DELIMITER_ENTRY: &str = "delimiter.entry";
pub const ENCLOSE_BY_QUOTES: &str = "enclose.by.quotes";
pub const OUTPUT_FORMAT: &str = "output.format";

/// Prefixes of keys passed through to the session.
pub const CONNECTION_PREFIXES: [&str; 2] = ["connection.", "hibernate.connection."];

pub const DEFAULT_STATUS_FILE_PATH: &str = "/var/lib/flume";
pub const DEFAULT_COLUMNS_TO_SELECT: &str = "*";
pub const DEFAULT_START_VALUE: &str = "0";
pub const DEFAULT_RUN_QUERY_DELAY_MS: u64 = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_ROWS: usize = 100;
