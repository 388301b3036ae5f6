// Lightweight performance and activity metrics
//
// Atomic counters, no locks. The persistor and the error reporter record
// into a shared Arc<Metrics>; hosts log the summary on shutdown.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for persistence and reporting activity.
#[derive(Debug)]
pub struct Metrics {
    /// Userlist documents loaded from disk (including first-run defaults)
    pub userlist_loads: AtomicUsize,

    /// Userlist documents successfully written to disk
    pub userlist_writes: AtomicUsize,

    /// Failed userlist write attempts
    pub userlist_write_failures: AtomicUsize,

    /// Tasks submitted to serialization queues
    pub queue_tasks: AtomicU64,

    /// Error reports surfaced to the notification callback
    pub reports_emitted: AtomicU64,

    /// Error reports suppressed by deduplication
    pub reports_suppressed: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            userlist_loads: AtomicUsize::new(0),
            userlist_writes: AtomicUsize::new(0),
            userlist_write_failures: AtomicUsize::new(0),
            queue_tasks: AtomicU64::new(0),
            reports_emitted: AtomicU64::new(0),
            reports_suppressed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_userlist_load(&self) {
        self.userlist_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_userlist_write(&self) {
        self.userlist_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_userlist_write_failure(&self) {
        self.userlist_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_task(&self) {
        self.queue_tasks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_emitted(&self) {
        self.reports_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_suppressed(&self) {
        self.reports_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the metrics instance was created.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log a summary of all counters.
    pub fn log_summary(&self) {
        tracing::info!(
            "Metrics: uptime {:.1}s, userlist {} loads / {} writes / {} failed writes, \
             {} queue tasks, {} reports emitted, {} suppressed",
            self.uptime().as_secs_f64(),
            self.userlist_loads.load(Ordering::Relaxed),
            self.userlist_writes.load(Ordering::Relaxed),
            self.userlist_write_failures.load(Ordering::Relaxed),
            self.queue_tasks.load(Ordering::Relaxed),
            self.reports_emitted.load(Ordering::Relaxed),
            self.reports_suppressed.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
