use crate::{
    error::PollError,
    health::{Health, HealthMonitor},
    retry::classify_poll_error,
};
use connectors::sql::base::adapter::SqlAdapter;
use engine_config::settings::validated::Configuration;
use engine_core::{
    connectors::sink::EventSink,
    metrics::Metrics,
    serializer::{EventFormat, encode_event_body},
    state::{CheckpointManager, StateStore},
};
use model::{
    pagination::cursor::Cursor,
    records::{batch::Batch, event::Event, row::RowData},
};
use planner::query::builder::QueryBuilder;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Created,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The query returned nothing; no commit.
    Empty,
    /// Rows were delivered but none carried a cursor value; no commit.
    Delivered { rows: usize, batches: usize },
    /// Rows were delivered and the new cursor is durable.
    Committed {
        rows: usize,
        batches: usize,
        cursor: Cursor,
    },
    /// Stop was requested mid-cycle; cursor and checkpoint are untouched.
    Cancelled,
}

/// Drives query, delivery and commit for a single source.
///
/// The cursor only moves after every row of a cycle has been handed to the
/// sink and the checkpoint write succeeded.
pub struct PollingExecutor {
    source_name: String,
    session: Arc<dyn SqlAdapter>,
    sink: Arc<dyn EventSink>,
    checkpoints: CheckpointManager,
    query: QueryBuilder,
    format: EventFormat,
    batch_size: usize,
    max_rows: usize,
    poll_delay: Duration,

    cursor: Cursor,
    state: ExecutorState,

    health: HealthMonitor,
    metrics: Metrics,
}

impl PollingExecutor {
    /// Prepares the status directory and restores the cursor from the checkpoint,
    /// seeding it from the configured initial value on first run.
    pub async fn new(
        config: &Configuration,
        session: Arc<dyn SqlAdapter>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self, PollError> {
        let checkpoints =
            CheckpointManager::new(store, config.identity(), config.initial_cursor.clone());
        let cursor = checkpoints.restore().await.map_err(PollError::Restore)?;

        Ok(Self {
            source_name: config.source_name.clone(),
            session,
            sink,
            checkpoints,
            query: config.query_builder(),
            format: config.event_format,
            batch_size: config.batch_size.max(1),
            max_rows: config.max_rows,
            poll_delay: config.poll_delay,
            cursor,
            state: ExecutorState::Created,
            health: HealthMonitor::default(),
            metrics: Metrics::new(),
        })
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_health(mut self, health: HealthMonitor) -> Self {
        self.health = health;
        self
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Overrides the in-memory cursor. The checkpoint is not touched.
    pub fn set_cursor(&mut self, cursor: impl Into<Cursor>) {
        self.cursor = cursor.into();
    }

    /// The configured query, before the cursor is applied.
    pub fn query(&self) -> &str {
        self.query.query()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn health(&self) -> watch::Receiver<Health> {
        self.health.subscribe()
    }

    /// Polls until `cancel` fires, waiting the poll delay between cycles.
    ///
    /// Cycle failures are logged and retried on the next tick; they never end
    /// the loop.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), PollError> {
        self.ensure_runnable()?;
        self.state = ExecutorState::Running;
        info!(
            source = %self.source_name,
            cursor = %self.cursor,
            delay_ms = self.poll_delay.as_millis() as u64,
            "Poller started"
        );

        loop {
            match self.run_cycle(&cancel).await {
                Ok(CycleOutcome::Cancelled) => break,
                Ok(outcome) => debug!(outcome = ?outcome, "Poll cycle finished"),
                Err(e) => error!(
                    source = %self.source_name,
                    cursor = %self.cursor,
                    error = %e,
                    "Poll cycle failed, retrying after delay"
                ),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.poll_delay) => {}
            }
        }

        self.stop().await;
        Ok(())
    }

    /// Runs exactly one query/deliver/commit cycle.
    pub async fn run_cycle(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<CycleOutcome, PollError> {
        self.ensure_runnable()?;
        self.state = ExecutorState::Running;
        self.metrics.increment_cycles();

        let result = self.poll_once(cancel).await;

        match &result {
            Ok(CycleOutcome::Cancelled) => {
                info!(cursor = %self.cursor, "Poll cycle cancelled, cursor unchanged");
            }
            Ok(_) => self.health.record_success(),
            Err(e) => {
                self.metrics.increment_failures(1);
                let health = self.health.record_failure(classify_poll_error(e), &e.to_string());
                if health.is_degraded() {
                    warn!(source = %self.source_name, health = %health, "Poller degraded");
                }
            }
        }
        result
    }

    /// Moves to `Stopped` and closes the session. Idempotent.
    pub async fn stop(&mut self) {
        if self.state == ExecutorState::Stopped {
            return;
        }
        self.state = ExecutorState::Stopped;

        if let Err(e) = self.session.close().await {
            warn!(error = %e, "Failed to close session");
        }
        info!(source = %self.source_name, cursor = %self.cursor, "Poller stopped");
    }

    fn ensure_runnable(&self) -> Result<(), PollError> {
        match self.state {
            ExecutorState::Stopped => Err(PollError::Stopped),
            _ => Ok(()),
        }
    }

    async fn poll_once(&mut self, cancel: &CancellationToken) -> Result<CycleOutcome, PollError> {
        let sql = self.query.build(&self.cursor)?;
        debug!(sql = %sql, cursor = %self.cursor, "Querying source");
        let rows = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(CycleOutcome::Cancelled),
            res = self.session.query_rows(&sql, self.max_rows) => res.map_err(|source| {
                PollError::Query { cursor: self.cursor.clone(), source }
            })?,
        };

        if rows.is_empty() {
            debug!(cursor = %self.cursor, "No new rows");
            return Ok(CycleOutcome::Empty);
        }

        let next = self
            .query
            .offset_strategy()
            .next_cursor(&rows, &self.cursor)?;
        let total = rows.len();

        let mut batches = 0;
        for (idx, chunk) in rows.chunks(self.batch_size).enumerate() {
            let batch = self.make_batch(chunk, next.as_ref(), idx)?;
            let (batch_id, len, bytes) = (batch.id.clone(), batch.len(), batch.size_bytes());

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(CycleOutcome::Cancelled),
                res = self.sink.deliver(batch) => res.map_err(|source| PollError::Deliver {
                    batch_id: batch_id.clone(),
                    source,
                })?,
            }

            batches += 1;
            self.metrics.increment_batches(1);
            self.metrics.increment_rows(len as u64);
            self.metrics.increment_bytes(bytes as u64);
            debug!(batch_id = %batch_id, rows = len, "Batch delivered");
        }

        let Some(next) = next else {
            warn!(
                rows = total,
                "Delivered rows carry no cursor value, cursor unchanged"
            );
            return Ok(CycleOutcome::Delivered {
                rows: total,
                batches,
            });
        };

        self.checkpoints
            .commit(&next)
            .await
            .map_err(|source| PollError::Commit {
                cursor: next.clone(),
                source,
            })?;
        self.metrics.increment_commits();

        info!(
            rows = total,
            batches,
            from = %self.cursor,
            to = %next,
            "Committed cursor"
        );
        self.cursor = next.clone();

        Ok(CycleOutcome::Committed {
            rows: total,
            batches,
            cursor: next,
        })
    }

    fn make_batch(
        &self,
        rows: &[RowData],
        next: Option<&Cursor>,
        idx: usize,
    ) -> Result<Batch, PollError> {
        let ts = chrono::Utc::now();
        let events = rows
            .iter()
            .map(|row| encode_event_body(row, &self.format).map(|body| Event::new(body, ts)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Batch {
            id: self.make_batch_id(next, idx),
            events,
            cursor: self.cursor.clone(),
            ts,
        })
    }

    /// Stable across replays of the same cycle.
    fn make_batch_id(&self, next: Option<&Cursor>, idx: usize) -> String {
        let mut h = blake3::Hasher::new();
        h.update(self.source_name.as_bytes());
        h.update(self.cursor.value().as_bytes());
        h.update(b"\0");
        if let Some(next) = next {
            h.update(next.value().as_bytes());
        }
        h.update(&idx.to_le_bytes());
        h.finalize().to_hex().to_string()
    }
}
