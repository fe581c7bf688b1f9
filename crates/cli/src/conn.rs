use crate::error::CliError;
use async_trait::async_trait;
use connectors::{adapter::Adapter, sql::base::settings::ConnectionSettings};
use tracing::{error, info};

/// Trait for "pinging" a data source
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

/// Pings through the same session the poller would use.
pub struct SessionPinger {
    pub settings: ConnectionSettings,
}

#[async_trait]
impl ConnectionPinger for SessionPinger {
    async fn ping(&self) -> Result<(), CliError> {
        let url = self.settings.driver_url();
        info!("Pinging '{url}'");

        let adapter = Adapter::open(&self.settings).await.map_err(|e| {
            error!("Connection to '{url}' failed: {e}");
            CliError::Connection(e)
        })?;
        let session = adapter.get_sql();

        let rows = session
            .query_rows("SELECT 1", 1)
            .await
            .map_err(|e| CliError::Ping(format!("query on '{url}' failed: {e}")))?;

        let value = rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(|value| value.as_i64());
        if value != Some(1) {
            let msg = format!("'{url}' returned unexpected result: {value:?}");
            error!("{msg}");
            return Err(CliError::Ping(msg));
        }

        if let Err(e) = session.close().await {
            error!("Failed to close session: {e}");
        }
        info!("Ping to '{url}' succeeded");
        Ok(())
    }
}
