//! RunOnceReport - outcome of one scheduling pass

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Per-pass counts returned by the manager's `run_once`
///
/// `updated + failed + skipped` equals the number of sensors registered when
/// the pass started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOnceReport {
    /// Sensors whose update succeeded
    pub updated: usize,
    /// Sensors whose update returned an error
    pub failed: usize,
    /// Sensors that were not due
    pub skipped: usize,
}

impl RunOnceReport {
    /// Sensors that were due (updated or failed)
    pub fn attempted(&self) -> usize {
        self.updated + self.failed
    }

    pub fn total(&self) -> usize {
        self.attempted() + self.skipped
    }
}

impl AddAssign for RunOnceReport {
    fn add_assign(&mut self, rhs: Self) {
        self.updated += rhs.updated;
        self.failed += rhs.failed;
        self.skipped += rhs.skipped;
    }
}
