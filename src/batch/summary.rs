use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Result of one run, returned to the trigger as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub message: String,
    /// Wall-clock seconds the run took.
    pub execution_time: f64,
    /// Rows the classifier was invoked for, whether or not it succeeded.
    pub analyzed_count: u32,
    pub promoted_count: u32,
    pub rejected_count: u32,
    pub failed_count: u32,
    pub write_failures: u32,
    pub skipped_count: u32,
    /// The time budget ran out with eligible rows left.
    pub stopped_early: bool,
    pub run_id: String,
    /// RFC 3339, UTC.
    pub completed_at: String,
}

/// Running counters for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub analyzed: u32,
    pub promoted: u32,
    pub rejected: u32,
    pub failed: u32,
    pub write_failures: u32,
    pub skipped: u32,
}

impl Tally {
    pub fn into_summary(self, run_id: &str, elapsed: Duration, stopped_early: bool) -> BatchSummary {
        let seconds = elapsed.as_secs_f64();
        let message = if stopped_early {
            format!(
                "Time budget exhausted. Analyzed articles: {}. Total execution time: {seconds:.2} \
seconds. Remaining rows are left for the next run",
                self.analyzed
            )
        } else {
            format!(
                "Analysis complete. Analyzed articles: {}. Total execution time: {seconds:.2} seconds",
                self.analyzed
            )
        };

        BatchSummary {
            message,
            execution_time: seconds,
            analyzed_count: self.analyzed,
            promoted_count: self.promoted,
            rejected_count: self.rejected,
            failed_count: self.failed,
            write_failures: self.write_failures,
            skipped_count: self.skipped,
            stopped_early,
            run_id: run_id.to_string(),
            completed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
