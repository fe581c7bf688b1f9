use crate::{
    error::AdapterError,
    sql::{
        base::{
            adapter::{DatabaseKind, SqlAdapter},
            settings::ConnectionSettings,
        },
        mysql::adapter::MySqlAdapter,
        postgres::adapter::PgAdapter,
    },
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
}

impl Adapter {
    /// Opens a session for the driver named by the URL scheme.
    pub async fn open(settings: &ConnectionSettings) -> Result<Self, AdapterError> {
        let kind = settings.kind();
        info!(kind = ?kind, "Opening data source session");

        match kind {
            DatabaseKind::MySql => {
                let adapter = MySqlAdapter::connect(settings).await?;
                Ok(Adapter::MySql(adapter))
            }
            DatabaseKind::Postgres => {
                let adapter = PgAdapter::connect(settings).await?;
                Ok(Adapter::Postgres(adapter))
            }
            DatabaseKind::Other(scheme) => Err(AdapterError::UnsupportedDriver(scheme)),
        }
    }

    pub fn get_sql(&self) -> &(dyn SqlAdapter + Send + Sync) {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
        }
    }

    pub fn into_session(self) -> Arc<dyn SqlAdapter> {
        match self {
            Adapter::MySql(adapter) => Arc::new(adapter),
            Adapter::Postgres(adapter) => Arc::new(adapter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_scheme_is_rejected_before_connecting() {
        let settings = ConnectionSettings::new("jdbc:oracle:thin:@host:1521:db");
        let err = Adapter::open(&settings).await.err().unwrap();
        assert!(matches!(err, AdapterError::UnsupportedDriver(s) if s == "oracle"));
    }
}
