//! Enrollment ledger — admission of learners into courses.
//!
//! Enforces one enrollment per (learner, course) and at most one
//! in-progress course per learner.

pub mod engine;
pub mod types;

pub use engine::admit;
pub use types::{progress_percent, Enrollment, ModuleCompletionEntry};
