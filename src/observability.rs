//! Dispatch counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handlers::Completed;

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    dispatched: AtomicU64,
    continued: AtomicU64,
    terminated: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "dispatched", "Metric incremented");
    }

    pub fn completed(&self, completed: &Completed) {
        if completed.continues_chain() {
            self.continued.fetch_add(1, Ordering::Relaxed);
        } else {
            self.terminated.fetch_add(1, Ordering::Relaxed);
        }

        let status = completed.status();
        if status.is_client_error() {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            continued: self.continued.load(Ordering::Relaxed),
            terminated: self.terminated.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub continued: u64,
    pub terminated: u64,
    pub client_errors: u64,
    pub server_errors: u64,
}
