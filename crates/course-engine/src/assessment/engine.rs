//! Assessment engine — scoring quiz attempts.

use crate::curriculum::{Lesson, LessonKind};
use crate::error::{CourseError, Result};
use crate::integrity::IntegritySummary;

use super::types::*;

// ---------------------------------------------------------------------------
// Score attempt
// ---------------------------------------------------------------------------

/// Score an attempt against an `mcq` lesson's question bank.
///
/// Answers match by exact string equality. Unanswered questions score zero.
/// Any integrity flag fails the attempt regardless of score. Pure: the same
/// lesson and attempt always give the same verdict.
pub fn score_attempt(lesson: &Lesson, attempt: &AssessmentAttempt) -> Result<AssessmentResult> {
    if lesson.kind != LessonKind::Mcq {
        return Err(CourseError::InvalidAttempt(format!(
            "lesson {} is a {} lesson, not a quiz",
            lesson.id, lesson.kind
        )));
    }
    if lesson.questions.is_empty() {
        return Err(CourseError::InvalidAttempt(format!(
            "lesson {} has no questions",
            lesson.id
        )));
    }

    // Reject answers to questions that are not in this lesson.
    let mut unknown: Vec<&str> = attempt
        .answers
        .keys()
        .filter(|id| lesson.question(id).is_none())
        .map(|id| id.as_str())
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(CourseError::InvalidAttempt(format!(
            "unknown question id(s) for lesson {}: {}",
            lesson.id,
            unknown.join(", ")
        )));
    }

    let mut score = 0u64;
    let mut total_points = 0u64;
    let mut correct_answers = 0usize;
    let mut unanswered = 0usize;

    for question in &lesson.questions {
        total_points += question.points as u64;
        match attempt.answers.get(&question.id) {
            Some(answer) if *answer == question.correct_answer => {
                score += question.points as u64;
                correct_answers += 1;
            }
            Some(_) => {}
            None => unanswered += 1,
        }
    }

    let violation_detected = attempt.has_integrity_violation();
    let passed = meets_threshold(score, total_points) && !violation_detected;

    if violation_detected {
        log::warn!(
            "attempt on lesson {} voided by {} integrity flag(s)",
            lesson.id,
            attempt.integrity_flags.len()
        );
    }
    log::debug!(
        "lesson {} scored {}/{} (passed: {})",
        lesson.id,
        score,
        total_points,
        passed
    );

    Ok(AssessmentResult {
        score,
        total_points,
        passed,
        violation_detected,
        correct_answers,
        unanswered,
        integrity: IntegritySummary::from_flags(&attempt.integrity_flags),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
