use crate::settings::{
    error::ConfigError,
    keys,
    raw::RawSettings,
    validated::{Configuration, ConfigurationBuilder},
};
use connectors::sql::base::settings::ConnectionSettings;
use engine_core::serializer::{BodyFormat, EventFormat};
use model::pagination::cursor::Cursor;
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};

/// Validates raw poller settings into a [`Configuration`].
pub struct SettingsValidator<'a> {
    source_name: &'a str,
    raw: &'a RawSettings,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(source_name: &'a str, raw: &'a RawSettings) -> Self {
        Self { source_name, raw }
    }

    pub fn validate(&self) -> Result<Configuration, ConfigError> {
        let mut builder = ConfigurationBuilder::new(self.source_name);
        let mut errors: Vec<ConfigError> = Vec::new();

        self.validate_status_file(&mut builder, &mut errors);
        self.validate_connection(&mut builder, &mut errors);
        self.validate_source(&mut builder, &mut errors);
        self.validate_initial_cursor(&mut builder, &mut errors);
        self.validate_sizes(&mut builder, &mut errors);
        self.validate_event_format(&mut builder, &mut errors);

        match errors.len() {
            0 => {}
            1 => return Err(errors.remove(0)),
            _ => return Err(ConfigError::ValidationFailed(errors)),
        }

        let config = builder.build()?;
        info!(
            source = %config.source_name,
            table = %config.table,
            mode = ?config.cursor_mode(),
            status_file = %config.status_file_path().display(),
            "Settings validated"
        );
        Ok(config)
    }

    fn validate_status_file(
        &self,
        builder: &mut ConfigurationBuilder,
        errors: &mut Vec<ConfigError>,
    ) {
        match self.raw.get_string(keys::STATUS_FILE_NAME) {
            Some(name) => builder.status_file_name = Some(name),
            None => errors.push(ConfigError::MissingRequired(keys::STATUS_FILE_NAME)),
        }
        builder.status_file_dir = self.raw.get_string(keys::STATUS_FILE_PATH).map(PathBuf::from);
    }

    fn validate_connection(
        &self,
        builder: &mut ConfigurationBuilder,
        errors: &mut Vec<ConfigError>,
    ) {
        let url = self
            .raw
            .get_string(keys::CONNECTION_URL)
            .or_else(|| self.raw.get_string(keys::LEGACY_CONNECTION_URL));

        let Some(url) = url else {
            errors.push(ConfigError::MissingRequired(keys::CONNECTION_URL));
            return;
        };

        let mut connection = ConnectionSettings::new(url);
        // legacy prefix first so the current one wins on conflicts
        for prefix in keys::CONNECTION_PREFIXES.iter().rev() {
            for (name, value) in self.raw.sub_properties(prefix) {
                if name != "url" {
                    connection = connection.with_property(name, value);
                }
            }
        }
        builder.connection = Some(connection);
    }

    fn validate_source(&self, builder: &mut ConfigurationBuilder, errors: &mut Vec<ConfigError>) {
        match self.raw.get_string(keys::TABLE) {
            Some(table) => builder.table = Some(table),
            None => errors.push(ConfigError::MissingRequired(keys::TABLE)),
        }
        builder.columns_to_select = self.raw.get_string(keys::COLUMNS_TO_SELECT);

        match self.raw.get_string(keys::CUSTOM_QUERY) {
            Some(query) => {
                let Some(column) = self.raw.get_string(keys::INCREMENTAL_COLUMN) else {
                    errors.push(ConfigError::CustomQueryWithoutIncrementalColumn);
                    return;
                };
                builder.custom_query = Some(query);
                builder.incremental_column = Some(column);
            }
            None => {
                builder.incremental_column = self
                    .raw
                    .get_string(keys::INCREMENTAL_COLUMN_NAME)
                    .or_else(|| self.raw.get_string(keys::INCREMENTAL_COLUMN));
                if builder.incremental_column.is_none() {
                    warn!("No incremental column configured, paging by row offset");
                }
            }
        }
    }

    fn validate_initial_cursor(
        &self,
        builder: &mut ConfigurationBuilder,
        errors: &mut Vec<ConfigError>,
    ) {
        let start = self.raw.get_string(keys::START_FROM);
        let legacy = self.raw.get_string(keys::INCREMENTAL_VALUE);
        let key = if start.is_some() {
            keys::START_FROM
        } else {
            keys::INCREMENTAL_VALUE
        };

        if let (Some(start), Some(legacy)) = (&start, &legacy) {
            if start != legacy {
                warn!(
                    start_from = %start,
                    incremental_value = %legacy,
                    "Both initial values given, using start.from"
                );
            }
        }
        let initial = start.or(legacy).map(Cursor::from);

        // row-offset paging needs a row count to start from
        let row_offset =
            builder.incremental_column.is_none() && self.raw.get_string(keys::CUSTOM_QUERY).is_none();
        if let (true, Some(cursor)) = (row_offset, &initial) {
            if let Err(e) = cursor.as_offset() {
                errors.push(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        }
        builder.initial_cursor = initial;
    }

    fn validate_sizes(&self, builder: &mut ConfigurationBuilder, errors: &mut Vec<ConfigError>) {
        match self.raw.get_integer(keys::RUN_QUERY_DELAY) {
            Ok(delay) => builder.poll_delay = delay.map(Duration::from_millis),
            Err(e) => errors.push(e),
        }
        builder.batch_size = self.positive(keys::BATCH_SIZE, errors);
        builder.max_rows = self.positive(keys::MAX_ROWS, errors);

        if let (Some(batch), Some(max)) = (builder.batch_size, builder.max_rows) {
            if batch > max {
                warn!(batch_size = batch, max_rows = max, "batch.size exceeds max.rows");
            }
        }
    }

    fn validate_event_format(
        &self,
        builder: &mut ConfigurationBuilder,
        errors: &mut Vec<ConfigError>,
    ) {
        let mut format = EventFormat::default();

        if let Some(body) = self.raw.get_string(keys::OUTPUT_FORMAT) {
            match body.to_ascii_lowercase().as_str() {
                "csv" => format.body = BodyFormat::Csv,
                "json" => format.body = BodyFormat::Json,
                _ => errors.push(ConfigError::InvalidValue {
                    key: keys::OUTPUT_FORMAT.to_string(),
                    reason: format!("expected 'csv' or 'json', got '{body}'"),
                }),
            }
        }

        if let Some(delimiter) = self.raw.get_string(keys::DELIMITER_ENTRY) {
            match delimiter.as_bytes() {
                [byte] if byte.is_ascii() => format.delimiter = *byte,
                _ => errors.push(ConfigError::InvalidValue {
                    key: keys::DELIMITER_ENTRY.to_string(),
                    reason: format!("expected a single ASCII character, got '{delimiter}'"),
                }),
            }
        }

        match self.raw.get_bool(keys::ENCLOSE_BY_QUOTES) {
            Ok(Some(enclose)) => format.enclose_by_quotes = enclose,
            Ok(None) => {}
            Err(e) => errors.push(e),
        }

        builder.event_format = Some(format);
    }

    fn positive(&self, key: &str, errors: &mut Vec<ConfigError>) -> Option<usize> {
        match self.raw.get_integer(key) {
            Ok(Some(0)) => {
                errors.push(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
                None
            }
            Ok(value) => value.map(|v| v as usize),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    }
}
