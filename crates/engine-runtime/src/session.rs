use connectors::{
    adapter::Adapter, error::AdapterError, sql::base::adapter::SqlAdapter,
    sql::base::settings::ConnectionSettings,
};
use engine_core::retry::RetryPolicy;
use engine_processing::retry::classify_adapter_error;
use std::sync::Arc;
use tracing::info;

/// Opens the session named by the connection URL, retrying transient failures.
pub async fn open_session(
    settings: &ConnectionSettings,
    policy: &RetryPolicy,
) -> Result<Arc<dyn SqlAdapter>, AdapterError> {
    let adapter = policy
        .run(|| Adapter::open(settings), classify_adapter_error)
        .await
        .map_err(|e| e.into_inner())?;

    info!(kind = ?adapter.get_sql().kind(), "Data source session ready");
    Ok(adapter.into_session())
}
