use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    rows_delivered: AtomicU64,
    bytes_delivered: AtomicU64,
    batches_delivered: AtomicU64,
    commits: AtomicU64,
    cycles: AtomicU64,
    failure_count: AtomicU64,
}

/// Poller counters, shared between the worker and whoever reports on it.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rows_delivered: u64,
    pub bytes_delivered: u64,
    pub batches_delivered: u64,
    pub commits: u64,
    pub cycles: u64,
    pub failure_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_rows(&self, count: u64) {
        self.inner.rows_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_bytes(&self, count: u64) {
        self.inner
            .bytes_delivered
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_batches(&self, count: u64) {
        self.inner
            .batches_delivered
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_commits(&self) {
        self.inner.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cycles(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.failure_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_delivered: self.inner.rows_delivered.load(Ordering::Relaxed),
            bytes_delivered: self.inner.bytes_delivered.load(Ordering::Relaxed),
            batches_delivered: self.inner.batches_delivered.load(Ordering::Relaxed),
            commits: self.inner.commits.load(Ordering::Relaxed),
            cycles: self.inner.cycles.load(Ordering::Relaxed),
            failure_count: self.inner.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
