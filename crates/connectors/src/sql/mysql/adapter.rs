use crate::sql::base::{
    adapter::{DatabaseKind, SqlAdapter},
    error::{ConnectorError, DbError},
    row::DbRow,
    settings::ConnectionSettings,
};
use async_trait::async_trait;
use model::records::row::RowData;
use mysql_async::{Opts, OptsBuilder, Pool, Row, prelude::Queryable};
use tracing::{debug, info};

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
}

impl MySqlAdapter {
    fn options(settings: &ConnectionSettings) -> Result<OptsBuilder, ConnectorError> {
        let opts = Opts::from_url(settings.driver_url())
            .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

        let mut builder = OptsBuilder::from_opts(opts);
        if let Some(user) = settings.user() {
            builder = builder.user(Some(user));
        }
        if let Some(password) = settings.password() {
            builder = builder.pass(Some(password));
        }
        Ok(builder)
    }
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectorError> {
        let pool = Pool::new(Self::options(settings)?);

        // fail fast on unreachable hosts or bad credentials
        let conn = pool.get_conn().await?;
        drop(conn);

        info!("MySQL session opened");
        Ok(MySqlAdapter { pool })
    }

    async fn query_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<RowData>, DbError> {
        debug!(sql, "Executing MySQL query");

        let mut conn = self.pool.get_conn().await?;
        // binary protocol, so values arrive typed instead of as text
        let rows: Vec<Row> = conn.exec(sql, ()).await?;

        let result = rows
            .iter()
            .take(max_rows)
            .map(|row| DbRow::MySqlRow(row).to_row_data(""))
            .collect();

        Ok(result)
    }

    async fn close(&self) -> Result<(), DbError> {
        self.pool.clone().disconnect().await?;
        info!("MySQL session closed");
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }
}
