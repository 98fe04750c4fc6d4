use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::OutcomeKind;

/// Point-in-time view of how dispatches ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounts {
    pub fast_rejected: u64,
    pub unresolved: u64,
    pub resolved_invalid: u64,
    pub executed: u64,
}

impl DispatchCounts {
    pub fn total(&self) -> u64 {
        self.fast_rejected + self.unresolved + self.resolved_invalid + self.executed
    }
}

/// Lock-free counters shared by concurrent dispatch calls.
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    fast_rejected: AtomicU64,
    unresolved: AtomicU64,
    resolved_invalid: AtomicU64,
    executed: AtomicU64,
}

impl DispatchCounters {
    pub(crate) fn record(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::FastRejected => &self.fast_rejected,
            OutcomeKind::Unresolved => &self.unresolved,
            OutcomeKind::ResolvedInvalid => &self.resolved_invalid,
            OutcomeKind::Executed => &self.executed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchCounts {
        DispatchCounts {
            fast_rejected: self.fast_rejected.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            resolved_invalid: self.resolved_invalid.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
        }
    }
}
