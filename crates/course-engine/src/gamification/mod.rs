//! Gamification ledger — point awards for completions.
//!
//! Awards are append-only increments; none is ever reversed.

pub mod engine;
pub mod types;

pub use engine::{apply_award, award_for};
pub use types::{
    AwardKind, PointAward, COURSE_COMPLETION_POINTS, MODULE_COMPLETION_POINTS,
    PROJECT_COURSE_COMPLETION_POINTS, PROJECT_SUBMISSION_POINTS,
};
