use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
        row::DbRow,
        settings::ConnectionSettings,
    },
    postgres::utils::{client_config, connect_client},
};
use async_trait::async_trait;
use model::records::row::RowData;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::Client;
use tracing::{debug, info};

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Option<Client>>>,
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectorError> {
        let client = connect_client(client_config(settings)?).await?;
        info!("Postgres session opened");
        Ok(PgAdapter {
            client: Arc::new(RwLock::new(Some(client))),
        })
    }

    async fn query_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<RowData>, DbError> {
        debug!(sql, "Executing Postgres query");

        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(DbError::Closed)?;
        let rows = client.query(sql, &[]).await?;

        let result = rows
            .iter()
            .take(max_rows)
            .map(|row| DbRow::PostgresRow(row).to_row_data(""))
            .collect();

        Ok(result)
    }

    async fn close(&self) -> Result<(), DbError> {
        // dropping the client ends the background connection task
        if self.client.write().await.take().is_some() {
            info!("Postgres session closed");
        }
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }
}
