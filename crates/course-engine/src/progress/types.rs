//! Data structures for module completion and progress reporting.

use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, ModuleId};

/// Events emitted by a module completion, consumed by the points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    ModuleCompleted {
        course_id: CourseId,
        module_id: ModuleId,
    },
    CourseCompleted {
        course_id: CourseId,
    },
}

/// Result of a `complete_module` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleCompletion {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub progress: u8,
    pub completed_modules: Vec<ModuleId>,
    pub completed_at: Option<u64>,
    /// True when the module had been completed before this call.
    pub already_completed: bool,
    /// Empty for repeated calls.
    pub events: Vec<ProgressEvent>,
}

impl ModuleCompletion {
    /// Whether this call sealed the enrollment.
    pub fn completed_course(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ProgressEvent::CourseCompleted { .. }))
    }
}

/// Learner-facing view of an enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub course_id: CourseId,
    pub enrolled_at: u64,
    pub completed_at: Option<u64>,
    pub progress: u8,
    pub total_modules: usize,
    pub completed_modules: Vec<ModuleId>,
    /// First incomplete module that has lessons.
    pub current_module: Option<ModuleId>,
    /// Incomplete modules whose predecessor is complete.
    pub unlocked_modules: Vec<ModuleId>,
}
