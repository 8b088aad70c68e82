//! Data structures for assessment attempts and verdicts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::QuestionId;
use crate::integrity::{IntegrityFlag, IntegrityMonitor, IntegritySummary};

/// Minimum share of points needed to pass, in percent.
pub const PASS_THRESHOLD_PERCENT: u64 = 70;

/// A submitted quiz attempt. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentAttempt {
    #[serde(default)]
    pub answers: HashMap<QuestionId, String>,
    #[serde(default)]
    pub integrity_flags: Vec<IntegrityFlag>,
}

impl AssessmentAttempt {
    /// An attempt with no answers and no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style answer.
    pub fn answer(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(QuestionId::new(question), answer.into());
        self
    }

    /// Attach the flags collected by a monitor.
    pub fn with_monitor(mut self, monitor: IntegrityMonitor) -> Self {
        self.integrity_flags.extend(monitor.into_flags());
        self
    }

    pub fn has_integrity_violation(&self) -> bool {
        crate::integrity::has_integrity_violation(&self.integrity_flags)
    }
}

/// Verdict for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score: u64,
    pub total_points: u64,
    pub passed: bool,
    pub violation_detected: bool,
    /// Questions answered exactly right.
    pub correct_answers: usize,
    /// Questions with no answer.
    pub unanswered: usize,
    pub integrity: IntegritySummary,
}

impl AssessmentResult {
    /// Whether the score alone clears the threshold.
    pub fn raw_pass(&self) -> bool {
        meets_threshold(self.score, self.total_points)
    }
}

/// `score >= 70% of total`, in integer arithmetic.
pub fn meets_threshold(score: u64, total_points: u64) -> bool {
    100 * score >= PASS_THRESHOLD_PERCENT * total_points
}
