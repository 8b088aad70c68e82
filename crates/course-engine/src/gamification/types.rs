//! Data structures for point awards.

use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, ModuleId};

/// Points for completing a module through a non-project lesson.
pub const MODULE_COMPLETION_POINTS: u64 = 10;
/// Points for completing a module through a project lesson.
pub const PROJECT_SUBMISSION_POINTS: u64 = 50;
/// Points for finishing a course.
pub const COURSE_COMPLETION_POINTS: u64 = 100;
/// Points for finishing a course with a project lesson.
pub const PROJECT_COURSE_COMPLETION_POINTS: u64 = 200;

/// Which award a completion event earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    ModuleCompletion,
    ProjectSubmission,
    CourseCompletion,
    ProjectCourseCompletion,
}

impl AwardKind {
    /// Point value of this award.
    pub fn points(&self) -> u64 {
        match self {
            AwardKind::ModuleCompletion => MODULE_COMPLETION_POINTS,
            AwardKind::ProjectSubmission => PROJECT_SUBMISSION_POINTS,
            AwardKind::CourseCompletion => COURSE_COMPLETION_POINTS,
            AwardKind::ProjectCourseCompletion => PROJECT_COURSE_COMPLETION_POINTS,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            AwardKind::ModuleCompletion => "module_completion",
            AwardKind::ProjectSubmission => "project_submission",
            AwardKind::CourseCompletion => "course_completion",
            AwardKind::ProjectCourseCompletion => "project_course_completion",
        }
    }

    /// Whether this is one of the course bonuses.
    pub fn is_course_bonus(&self) -> bool {
        matches!(
            self,
            AwardKind::CourseCompletion | AwardKind::ProjectCourseCompletion
        )
    }
}

impl std::fmt::Display for AwardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// An entry in a learner's append-only award log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAward {
    pub kind: AwardKind,
    pub points: u64,
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub awarded_at: u64,
}
