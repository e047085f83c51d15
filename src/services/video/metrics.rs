use serde::{Deserialize, Serialize};

/// Process-wide failure counters.
///
/// Monotonic; reset only by a fresh state or an explicit clear.
/// `total_errors` counts every failure of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorMetrics {
    /// Disposals that failed or timed out
    pub disposal_errors: u64,

    /// Successful recoveries
    pub recovery_successes: u64,

    /// Failed recoveries
    pub recovery_failures: u64,

    /// Every recorded failure
    pub total_errors: u64,
}

impl ErrorMetrics {
    pub(crate) fn record_disposal_error(&mut self) {
        self.disposal_errors += 1;
        self.total_errors += 1;
    }

    pub(crate) fn record_recovery_success(&mut self) {
        self.recovery_successes += 1;
    }

    pub(crate) fn record_recovery_failure(&mut self) {
        self.recovery_failures += 1;
        self.total_errors += 1;
    }

    pub(crate) fn record_general_error(&mut self) {
        self.total_errors += 1;
    }
}
