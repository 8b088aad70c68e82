//! Progress engine — sequential unlocking, idempotent completion, reporting.
//!
//! Every module occupies a slot in the sequence, including modules with no
//! lessons: the predecessor of module *i* is always module *i−1* by
//! `order`. Empty modules are only skipped when choosing the learner's
//! current module.

use crate::curriculum::Module;
use crate::enrollment::{progress_percent, Enrollment, ModuleCompletionEntry};
use crate::error::{CourseError, Result};
use crate::ids::ModuleId;

use super::types::*;

// ---------------------------------------------------------------------------
// Unlock check
// ---------------------------------------------------------------------------

/// Position of `module_id` in the ordered module list.
fn position(enrollment: &Enrollment, ordered: &[Module], module_id: &ModuleId) -> Result<usize> {
    ordered
        .iter()
        .position(|m| &m.id == module_id)
        .ok_or_else(|| CourseError::ModuleNotFound {
            course: enrollment.course_id.to_string(),
            module: module_id.to_string(),
        })
}

/// Check that `module_id` may be completed now.
///
/// `ordered` must be sorted by `order`.
pub fn check_unlocked(
    enrollment: &Enrollment,
    ordered: &[Module],
    module_id: &ModuleId,
) -> Result<()> {
    let index = position(enrollment, ordered, module_id)?;
    if index == 0 {
        return Ok(());
    }

    let previous = &ordered[index - 1].id;
    if enrollment.has_completed(previous) {
        Ok(())
    } else {
        Err(CourseError::SequenceViolation {
            module: module_id.to_string(),
            previous: previous.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Complete module
// ---------------------------------------------------------------------------

/// Mark a module complete.
///
/// Repeated calls for an already-completed module return the current state
/// with no events. The caller must hold the learner's write lock for the
/// whole call so the membership check and the append are one step.
pub fn complete_module(
    enrollment: &mut Enrollment,
    ordered: &[Module],
    module_id: &ModuleId,
    now: u64,
) -> Result<ModuleCompletion> {
    position(enrollment, ordered, module_id)?;

    if enrollment.has_completed(module_id) {
        return Ok(snapshot(enrollment, module_id, true, Vec::new()));
    }

    check_unlocked(enrollment, ordered, module_id)?;

    enrollment.completed_modules.push(module_id.clone());
    enrollment.history.push(ModuleCompletionEntry {
        module_id: module_id.clone(),
        completed_at: now,
    });

    let total = ordered.len();
    let done = ordered
        .iter()
        .filter(|m| enrollment.has_completed(&m.id))
        .count();
    enrollment.progress = progress_percent(done, total);

    let mut events = Vec::with_capacity(2);
    if done == total && enrollment.completed_at.is_none() {
        enrollment.completed_at = Some(now);
        events.push(ProgressEvent::CourseCompleted {
            course_id: enrollment.course_id.clone(),
        });
    }
    events.push(ProgressEvent::ModuleCompleted {
        course_id: enrollment.course_id.clone(),
        module_id: module_id.clone(),
    });

    Ok(snapshot(enrollment, module_id, false, events))
}

fn snapshot(
    enrollment: &Enrollment,
    module_id: &ModuleId,
    already_completed: bool,
    events: Vec<ProgressEvent>,
) -> ModuleCompletion {
    ModuleCompletion {
        course_id: enrollment.course_id.clone(),
        module_id: module_id.clone(),
        progress: enrollment.progress,
        completed_modules: enrollment.completed_modules.clone(),
        completed_at: enrollment.completed_at,
        already_completed,
        events,
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The first incomplete module that has at least one lesson.
pub fn current_module(enrollment: &Enrollment, ordered: &[Module]) -> Option<ModuleId> {
    ordered
        .iter()
        .find(|m| !m.is_empty() && !enrollment.has_completed(&m.id))
        .map(|m| m.id.clone())
}

/// Incomplete modules that `check_unlocked` would accept right now.
pub fn unlocked_modules(enrollment: &Enrollment, ordered: &[Module]) -> Vec<ModuleId> {
    ordered
        .iter()
        .enumerate()
        .filter(|(i, m)| {
            !enrollment.has_completed(&m.id)
                && (*i == 0 || enrollment.has_completed(&ordered[i - 1].id))
        })
        .map(|(_, m)| m.id.clone())
        .collect()
}

/// Build the learner-facing progress report.
pub fn report(enrollment: &Enrollment, ordered: &[Module]) -> ProgressReport {
    ProgressReport {
        course_id: enrollment.course_id.clone(),
        enrolled_at: enrollment.enrolled_at,
        completed_at: enrollment.completed_at,
        progress: enrollment.progress,
        total_modules: ordered.len(),
        completed_modules: enrollment.completed_modules.clone(),
        current_module: current_module(enrollment, ordered),
        unlocked_modules: unlocked_modules(enrollment, ordered),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
