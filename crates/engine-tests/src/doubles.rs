//! In-memory stand-ins for the session, the sink and the checkpoint store.

use async_trait::async_trait;
use connectors::sql::base::{
    adapter::{DatabaseKind, SqlAdapter},
    error::{ConnectorError, DbError},
    settings::ConnectionSettings,
};
use engine_core::{
    connectors::sink::EventSink,
    error::{CheckpointError, SinkError},
    state::{StateStore, models::Checkpoint, status_file::StatusFileStore},
};
use model::records::{batch::Batch, row::RowData};
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tokio::sync::Notify;

/// Replays scripted query results and records every statement it sees.
#[derive(Default)]
pub struct MockSession {
    results: Mutex<VecDeque<Result<Vec<RowData>, DbError>>>,
    queries: Mutex<Vec<String>>,
    hang: AtomicBool,
    started: Notify,
    closed: AtomicBool,
    fail_close: AtomicBool,
}

impl MockSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A session whose queries never complete.
    pub fn hanging() -> Arc<Self> {
        let session = Self::default();
        session.hang.store(true, Ordering::SeqCst);
        Arc::new(session)
    }

    pub fn push_rows(&self, rows: Vec<RowData>) -> &Self {
        self.results.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn push_error(&self, err: DbError) -> &Self {
        self.results.lock().unwrap().push_back(Err(err));
        self
    }

    /// Makes `close` report an error after marking the session closed.
    pub fn fail_on_close(&self) -> &Self {
        self.fail_close.store(true, Ordering::SeqCst);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves once a query is in flight.
    pub async fn query_started(&self) {
        self.started.notified().await
    }
}

#[async_trait]
impl SqlAdapter for MockSession {
    async fn connect(_settings: &ConnectionSettings) -> Result<Self, ConnectorError> {
        Ok(Self::default())
    }

    async fn query_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<RowData>, DbError> {
        self.queries.lock().unwrap().push(sql.to_string());
        self.started.notify_one();

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(Ok(rows)) => Ok(rows.into_iter().take(max_rows).collect()),
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    async fn close(&self) -> Result<(), DbError> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(DbError::Unknown("connection reset".into()));
        }
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Other("mock".into())
    }
}

/// Keeps delivered batches; can be switched to reject them.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Batch>>,
    fail: AtomicBool,
    fail_after: Mutex<Option<usize>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        Arc::new(sink)
    }

    /// Accepts `n` batches, then rejects the rest.
    pub fn failing_after(n: usize) -> Arc<Self> {
        let sink = Self::default();
        *sink.fail_after.lock().unwrap() = Some(n);
        Arc::new(sink)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn row_count(&self) -> usize {
        self.batches.lock().unwrap().iter().map(Batch::len).sum()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn deliver(&self, batch: Batch) -> Result<(), SinkError> {
        let mut batches = self.batches.lock().unwrap();
        let over_limit = matches!(*self.fail_after.lock().unwrap(), Some(n) if batches.len() >= n);

        if self.fail.load(Ordering::SeqCst) || over_limit {
            return Err(SinkError::Rejected("channel full".into()));
        }
        batches.push(batch);
        Ok(())
    }
}

/// Status file store whose writes can be made to fail.
pub struct FlakyStore {
    inner: StatusFileStore,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: StatusFileStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn prepare(&self) -> Result<(), CheckpointError> {
        self.inner.prepare().await
    }

    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        self.inner.load_checkpoint().await
    }

    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), CheckpointError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CheckpointError::Write {
                path: PathBuf::from(self.inner.location()),
                source: std::io::Error::other("disk full"),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.save_checkpoint(cp).await
    }

    fn location(&self) -> String {
        self.inner.location()
    }
}
