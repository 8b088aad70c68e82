//! Integrity monitor — accumulates signals during an attempt window.
//!
//! Signals come from the client and are not authenticated; a client that
//! omits them passes unnoticed. The veto they trigger is deterrence only.

use super::types::{IntegrityFlag, IntegrityFlagKind, IntegritySummary};

/// Collects integrity flags for one open assessment attempt.
#[derive(Debug, Clone, Default)]
pub struct IntegrityMonitor {
    flags: Vec<IntegrityFlag>,
}

impl IntegrityMonitor {
    /// Start an empty attempt window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signal. Repeats are kept; the count is informative.
    pub fn record(&mut self, kind: IntegrityFlagKind, timestamp: u64) {
        self.flags.push(IntegrityFlag { kind, timestamp });
    }

    /// Any flag at all voids the attempt.
    pub fn has_violation(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Number of flags of one kind.
    pub fn count(&self, kind: IntegrityFlagKind) -> usize {
        self.flags.iter().filter(|f| f.kind == kind).count()
    }

    pub fn summary(&self) -> IntegritySummary {
        IntegritySummary::from_flags(&self.flags)
    }

    /// Flags in the order they were raised.
    pub fn flags(&self) -> &[IntegrityFlag] {
        &self.flags
    }

    /// Close the window and hand the flags to the attempt.
    pub fn into_flags(self) -> Vec<IntegrityFlag> {
        self.flags
    }
}

/// `true` iff the flag list is non-empty. There is no tolerance threshold.
pub fn has_integrity_violation(flags: &[IntegrityFlag]) -> bool {
    !flags.is_empty()
}
