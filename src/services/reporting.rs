use std::sync::{Arc, Mutex};

use super::load_order::LoadOrderError;
use crate::metrics::Metrics;

/// User-facing notification surface, supplied by the host shell.
pub trait Notify: Send + Sync {
    fn notify(&self, report: ErrorReport);
}

/// A classified, human-readable failure report.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// Dedup key derived from the title; the same failure repeated in
    /// immediate succession coalesces on this.
    pub id: String,

    pub title: String,

    /// One line per detail: invalid entries with reasons, or the attempted
    /// order.
    pub details: Vec<String>,

    /// Whether the failure may be auto-reported to the maintainers. Always
    /// false for community-contributed adapters.
    pub allow_report: bool,
}

/// Classifies load order failures and forwards them to the notification
/// surface, suppressing immediate repeats of the same report.
pub struct ErrorReporter<N: Notify> {
    notifier: N,
    metrics: Arc<Metrics>,
    last_reported: Mutex<Option<String>>,
}

impl<N: Notify> ErrorReporter<N> {
    pub fn new(notifier: N, metrics: Arc<Metrics>) -> Self {
        Self {
            notifier,
            metrics,
            last_reported: Mutex::new(None),
        }
    }

    /// Classify `err` and notify the user.
    ///
    /// `contributed` is the adapter's contribution flag for `game_id`;
    /// contributed adapters' failures are never eligible for upstream
    /// reporting.
    pub fn report(&self, game_id: &str, contributed: bool, err: &LoadOrderError) {
        let allow_report = !contributed;

        let report = match err {
            LoadOrderError::Validation { invalid, attempted } => {
                let mut details = vec![format!("Load order: {}", attempted.join(", "))];
                details.extend(
                    invalid
                        .iter()
                        .map(|failure| format!("{} - {}", failure.id, failure.reason)),
                );
                self.build_report("Load order failed validation", details, allow_report)
            }
            LoadOrderError::Serialization { attempted, .. } => self.build_report(
                "Failed to serialize load order",
                vec![format!("Load order: {}", attempted.join(", "))],
                allow_report,
            ),
            other => self.build_report(
                "Failed load order operation",
                vec![other.to_string()],
                allow_report,
            ),
        };

        let mut last = self.last_reported.lock().unwrap();
        if last.as_deref() == Some(report.id.as_str()) {
            tracing::debug!(game = game_id, id = %report.id, "suppressing repeated report");
            self.metrics.record_report_suppressed();
            return;
        }
        *last = Some(report.id.clone());
        drop(last);

        tracing::warn!(game = game_id, "{}: {}", report.title, err);
        self.metrics.record_report_emitted();
        self.notifier.notify(report);
    }

    /// Forget the last reported failure, making it reportable again.
    pub fn reset(&self) {
        *self.last_reported.lock().unwrap() = None;
    }

    fn build_report(
        &self,
        title: &str,
        details: Vec<String>,
        allow_report: bool,
    ) -> ErrorReport {
        ErrorReport {
            id: format!("{title}-notification"),
            title: title.to_string(),
            details,
            allow_report,
        }
    }
}
