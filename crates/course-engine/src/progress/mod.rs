//! Progress tracker — module completion within an enrollment.
//!
//! The progress module provides:
//! - Sequential unlock checks
//! - Idempotent module completion with progress recomputation
//! - Course completion sealing and completion events
//! - Learner-facing progress reports

pub mod engine;
pub mod types;

pub use types::{ModuleCompletion, ProgressEvent, ProgressReport};

pub use engine::{check_unlocked, complete_module, current_module, report, unlocked_modules};
