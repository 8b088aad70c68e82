//! Assessment scorer — quiz attempts against a lesson's question bank.
//!
//! The assessment module provides:
//! - Attempt and result types
//! - Exact-match scoring with a fixed 70% pass threshold
//! - Integrity veto folding

pub mod engine;
pub mod types;

pub use engine::score_attempt;
pub use types::{meets_threshold, AssessmentAttempt, AssessmentResult, PASS_THRESHOLD_PERCENT};
