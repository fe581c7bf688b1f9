use engine_core::retry::RetryDisposition;
use std::fmt;
use tokio::sync::watch;

/// Consecutive failed cycles before a transient problem is reported.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Starting,
    Healthy,
    Degraded {
        consecutive_failures: u32,
        last_error: String,
    },
}

impl Health {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Health::Degraded { .. })
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Starting => f.write_str("starting"),
            Health::Healthy => f.write_str("healthy"),
            Health::Degraded {
                consecutive_failures,
                last_error,
            } => write!(f, "degraded after {consecutive_failures} failures: {last_error}"),
        }
    }
}

/// Counts failed cycles and publishes the resulting [`Health`].
#[derive(Debug)]
pub struct HealthMonitor {
    threshold: u32,
    consecutive_failures: u32,
    tx: watch::Sender<Health>,
}

impl HealthMonitor {
    pub fn new(threshold: u32) -> Self {
        let (tx, _) = watch::channel(Health::Starting);
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Health> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Health {
        self.tx.borrow().clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.publish(Health::Healthy);
    }

    /// Non-retryable errors degrade immediately; transient ones only once
    /// the threshold is reached.
    pub fn record_failure(&mut self, disposition: RetryDisposition, error: &str) -> Health {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        let degraded = disposition == RetryDisposition::Stop
            || self.consecutive_failures >= self.threshold;
        if degraded {
            self.publish(Health::Degraded {
                consecutive_failures: self.consecutive_failures,
                last_error: error.to_string(),
            });
        }
        self.current()
    }

    fn publish(&self, health: Health) {
        // keeps the value even when nobody subscribed yet
        self.tx.send_if_modified(|current| {
            if *current == health {
                return false;
            }
            *current = health;
            true
        });
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}
