//! Process-wide counters for orchestration activity.
//!
//! Incremented at the call site; [`Metrics::flush`] emits them as one
//! `tracing::info!` event, typically when a run ends.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    runs_started: AtomicU64,
    manager_calls: AtomicU64,
    worker_calls: AtomicU64,
    assignment_retries: AtomicU64,
    tasks_completed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            manager_calls: AtomicU64::new(0),
            worker_calls: AtomicU64::new(0),
            assignment_retries: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
        }
    }

    pub fn inc_runs(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_started", "counter incremented");
    }

    pub fn inc_manager_calls(&self) {
        self.manager_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "manager_calls", "counter incremented");
    }

    pub fn inc_worker_calls(&self) {
        self.worker_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "worker_calls", "counter incremented");
    }

    /// One failed assignment attempt.
    pub fn inc_assignment_retries(&self) {
        self.assignment_retries.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "assignment_retries", "counter incremented");
    }

    pub fn inc_tasks_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tasks_completed", "counter incremented");
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            manager_calls = self.manager_calls(),
            worker_calls = self.worker_calls(),
            assignment_retries = self.assignment_retries(),
            tasks_completed = self.tasks_completed(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn manager_calls(&self) -> u64 {
        self.manager_calls.load(Ordering::Relaxed)
    }

    pub fn worker_calls(&self) -> u64 {
        self.worker_calls.load(Ordering::Relaxed)
    }

    pub fn assignment_retries(&self) -> u64 {
        self.assignment_retries.load(Ordering::Relaxed)
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_started.store(0, Ordering::Relaxed);
        self.manager_calls.store(0, Ordering::Relaxed);
        self.worker_calls.store(0, Ordering::Relaxed);
        self.assignment_retries.store(0, Ordering::Relaxed);
        self.tasks_completed.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_manager_calls();
        m.inc_manager_calls();
        m.inc_worker_calls();
        m.inc_assignment_retries();
        assert_eq!(m.manager_calls(), 2);
        assert_eq!(m.worker_calls(), 1);
        assert_eq!(m.assignment_retries(), 1);
        assert_eq!(m.runs_started(), 0);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_runs();
        m.inc_tasks_completed();
        m.reset();
        assert_eq!(m.runs_started(), 0);
        assert_eq!(m.tasks_completed(), 0);
    }
}
