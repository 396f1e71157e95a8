//! Run accounting and outcomes.

use std::fmt;

use photoreel_common::{Error, ErrorKind, RunId, RunMode};
use serde::Serialize;

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Photos enriched and turned into events (dispatched or, in dry-run
    /// mode, built only).
    pub processed: u64,
    /// Events handed to subscribers. Stays 0 in dry-run mode.
    pub events_dispatched: u64,
    pub pages_visited: u32,
    /// Photos dropped because enrichment failed under the skip policy.
    pub skipped: u64,
    /// Photo count reported by the source on the last page fetched.
    pub total_reported: u64,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} dispatched, {} skipped, {} pages",
            self.processed, self.events_dispatched, self.skipped, self.pages_visited
        )
    }
}

/// Why a run ended before exhausting its pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum StopReason {
    /// A subscriber asked to stop.
    Subscriber { name: String },
    /// The configured photo limit was reached.
    Limit { limit: u64 },
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every page was visited, or the source returned an empty page.
    Exhausted,
    Stopped(StopReason),
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::Stopped(StopReason::Subscriber { name }) => {
                write!(f, "stopped by subscriber '{name}'")
            }
            Self::Stopped(StopReason::Limit { limit }) => write!(f, "stopped at limit {limit}"),
        }
    }
}

/// Result of a run that ended normally or early.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub mode: RunMode,
    pub status: RunStatus,
    pub stats: RunStats,
    /// Last page fetched, if any.
    pub last_page: Option<u32>,
}

impl RunReport {
    pub fn is_exhausted(&self) -> bool {
        self.status == RunStatus::Exhausted
    }
}

/// A run aborted by an unrecoverable error, with the counters reached so far.
#[derive(Debug, thiserror::Error)]
#[error("run failed after {} processed photos: {error}", .stats.processed)]
pub struct RunFailure {
    pub error: Error,
    pub stats: RunStats,
}

impl RunFailure {
    pub fn new(error: Error, stats: RunStats) -> Self {
        Self { error, stats }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}
