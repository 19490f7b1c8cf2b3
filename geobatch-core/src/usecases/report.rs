use std::fmt;

use super::prelude::*;

/// A record that has been dropped because it could not
/// be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub key: RowKey,
    /// The address or position that has been sent to the provider.
    pub query: Option<String>,
    pub error: Error,
}

/// What happened to the records of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Number of input records that have been processed.
    pub total: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub failures: Vec<RecordFailure>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Records that didn't make it into the output.
    pub fn dropped(&self) -> usize {
        self.not_found + self.failed()
    }

    pub(crate) fn log_summary(&self, what: &str) {
        for failure in &self.failures {
            log::warn!("{} of record {} failed: {}", what, failure.key, failure.error);
        }
        if self.cancelled {
            log::warn!("{} cancelled: {}", what, self);
        } else {
            log::info!("{} finished: {}", what, self);
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} resolved, {} not found, {} failed",
            self.total,
            self.resolved,
            self.not_found,
            self.failed()
        )
    }
}
