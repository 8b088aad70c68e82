//! Integrity monitor — behavioral signals raised during an assessment.

pub mod monitor;
pub mod types;

pub use monitor::{has_integrity_violation, IntegrityMonitor};
pub use types::{IntegrityFlag, IntegrityFlagKind, IntegritySummary};
