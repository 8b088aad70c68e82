//! Data structures for enrollments.

use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, ModuleId};

/// One entry in an enrollment's append-only completion history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCompletionEntry {
    pub module_id: ModuleId,
    pub completed_at: u64,
}

/// The record binding one learner to one course's progression state.
///
/// `completed_at` is set exactly when every module of the course has been
/// completed; after that the enrollment only changes through its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub enrolled_at: u64,
    pub completed_at: Option<u64>,
    /// Percentage 0–100.
    pub progress: u8,
    /// Completed module ids in completion order, no duplicates.
    pub completed_modules: Vec<ModuleId>,
    #[serde(default)]
    pub history: Vec<ModuleCompletionEntry>,
}

impl Enrollment {
    /// A fresh enrollment with no progress.
    pub fn new(course_id: CourseId, now: u64) -> Self {
        Self {
            course_id,
            enrolled_at: now,
            completed_at: None,
            progress: 0,
            completed_modules: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Still in progress.
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether `module` has been completed.
    pub fn has_completed(&self, module: &ModuleId) -> bool {
        self.completed_modules.contains(module)
    }
}

/// `round(100 * completed / total)`, rounding halves up.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}
