use crate::sql::base::{
    error::{ConnectorError, DbError},
    settings::ConnectionSettings,
};
use async_trait::async_trait;
use model::records::row::RowData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
    Other(String),
}

/// An open session against the data source.
///
/// `query_rows` must be cancel-safe: the poller abandons an in-flight query
/// by dropping the returned future.
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    /// Runs `sql` and returns at most `max_rows` rows, column order preserved.
    async fn query_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<RowData>, DbError>;

    async fn close(&self) -> Result<(), DbError>;

    fn kind(&self) -> DatabaseKind;
}
