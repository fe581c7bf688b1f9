use crate::{error::RuntimeError, session::open_session};
use connectors::sql::base::adapter::SqlAdapter;
use engine_config::settings::validated::Configuration;
use engine_core::{
    connectors::sink::EventSink, metrics::Metrics, retry::RetryPolicy, state::StateStore,
};
use engine_processing::{
    error::PollError,
    health::Health,
    producer::poller::PollingExecutor,
};
use model::pagination::cursor::Cursor;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Starts pollers as background tasks.
pub struct SourceRuntime;

impl SourceRuntime {
    /// Opens the session for `config` and starts polling into `sink`,
    /// checkpointing to the configured status file.
    pub async fn connect(
        config: &Configuration,
        sink: Arc<dyn EventSink>,
    ) -> Result<RuntimeHandle, RuntimeError> {
        let session = open_session(&config.connection, &RetryPolicy::for_session()).await?;
        let store = Arc::new(config.status_store());
        Self::start(config, session, sink, store).await
    }

    /// Restores the checkpoint and spawns the poll loop.
    ///
    /// Startup failures (status directory, unreadable checkpoint) are
    /// returned here; later cycle failures only show up in [`Health`].
    pub async fn start(
        config: &Configuration,
        session: Arc<dyn SqlAdapter>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn StateStore>,
    ) -> Result<RuntimeHandle, RuntimeError> {
        let metrics = Metrics::new();
        let mut executor = match PollingExecutor::new(config, session.clone(), sink, store).await
        {
            Ok(executor) => executor.with_metrics(metrics.clone()),
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!(error = %close_err, "Failed to close session");
                }
                return Err(e.into());
            }
        };

        let health = executor.health();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        info!(source = %config.source_name, query = executor.query(), "Starting poller");
        let task = tokio::spawn(async move {
            executor.run(token).await?;
            Ok::<_, PollError>(executor.cursor().clone())
        });

        Ok(RuntimeHandle {
            cancel,
            task,
            health,
            metrics,
        })
    }
}

/// Control handle of a running poller.
pub struct RuntimeHandle {
    cancel: CancellationToken,
    task: JoinHandle<Result<Cursor, PollError>>,
    health: watch::Receiver<Health>,
    metrics: Metrics,
}

impl RuntimeHandle {
    pub fn health(&self) -> watch::Receiver<Health> {
        self.health.clone()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the poller to finish, which happens once the cancel token fires.
    pub async fn wait(self) -> Result<Cursor, RuntimeError> {
        Ok(self.task.await??)
    }

    /// Interrupts any in-flight cycle and waits for the worker to exit.
    /// Returns the last committed cursor.
    pub async fn stop(self) -> Result<Cursor, RuntimeError> {
        self.cancel.cancel();
        self.wait().await
    }
}
