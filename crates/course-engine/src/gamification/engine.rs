//! Points engine — one award per completion event.

use crate::curriculum::LessonKind;
use crate::ids::{CourseId, ModuleId};
use crate::learner::LearnerRecord;
use crate::progress::ProgressEvent;

use super::types::*;

/// Pick the single award for a completion's events.
///
/// The course bonus supersedes the module and project bonuses; a project
/// lesson that finishes the course earns the larger course bonus only.
/// Returns `None` when there is no module completion (repeat calls).
pub fn award_for(
    events: &[ProgressEvent],
    completing_lesson: Option<LessonKind>,
) -> Option<AwardKind> {
    let module_completed = events
        .iter()
        .any(|e| matches!(e, ProgressEvent::ModuleCompleted { .. }));
    if !module_completed {
        return None;
    }

    let course_completed = events
        .iter()
        .any(|e| matches!(e, ProgressEvent::CourseCompleted { .. }));
    let via_project = completing_lesson == Some(LessonKind::Project);

    Some(match (course_completed, via_project) {
        (true, true) => AwardKind::ProjectCourseCompletion,
        (true, false) => AwardKind::CourseCompletion,
        (false, true) => AwardKind::ProjectSubmission,
        (false, false) => AwardKind::ModuleCompletion,
    })
}

/// Credit an award to the learner and append it to the award log.
pub fn apply_award(
    record: &mut LearnerRecord,
    kind: AwardKind,
    course_id: &CourseId,
    module_id: &ModuleId,
    now: u64,
) -> PointAward {
    let award = PointAward {
        kind,
        points: kind.points(),
        course_id: course_id.clone(),
        module_id: module_id.clone(),
        awarded_at: now,
    };
    record.points = record.points.saturating_add(award.points);
    record.awards.push(award.clone());
    award
}
