//! Data structures for the Course → Module → Lesson hierarchy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CourseError, Result};
use crate::ids::{CourseId, LessonId, ModuleId, QuestionId};

// ---------------------------------------------------------------------------
// Lesson kind
// ---------------------------------------------------------------------------

/// The variant of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Text,
    Mcq,
    Project,
    Summary,
}

impl LessonKind {
    /// Lowercase tag used on disk and in the CLI.
    pub fn as_tag(&self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Text => "text",
            LessonKind::Mcq => "mcq",
            LessonKind::Project => "project",
            LessonKind::Summary => "summary",
        }
    }
}

impl std::fmt::Display for LessonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A multiple-choice question owned by an `mcq` lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
}

// ---------------------------------------------------------------------------
// Lesson
// ---------------------------------------------------------------------------

/// A single unit of content inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    /// Question bank; only meaningful for `mcq` lessons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
}

impl Lesson {
    /// Sum of all question points.
    pub fn total_points(&self) -> u64 {
        self.questions.iter().map(|q| q.points as u64).sum()
    }

    /// Look up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// An ordered group of lessons. `order` is unique within its course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    #[serde(default)]
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    /// A module without lessons is never "current" for navigation.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Look up a lesson by id.
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == id)
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A course as served by the curriculum store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub instructor_name: String,
    pub modules: Vec<Module>,
}

impl Course {
    /// Modules sorted by their `order` field.
    pub fn ordered_modules(&self) -> Vec<Module> {
        let mut modules = self.modules.clone();
        modules.sort_by_key(|m| m.order);
        modules
    }

    /// Look up a module by id.
    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == id)
    }

    /// Check structural consistency.
    ///
    /// Module orders and ids must be unique, lesson ids unique per module,
    /// question ids unique per lesson and every question worth at least
    /// one point.
    pub fn validate(&self) -> Result<()> {
        if self.modules.is_empty() {
            return Err(CourseError::InvalidCurriculum(format!(
                "course {} has no modules",
                self.id
            )));
        }

        let mut orders = HashSet::new();
        let mut module_ids = HashSet::new();
        for module in &self.modules {
            if !orders.insert(module.order) {
                return Err(CourseError::InvalidCurriculum(format!(
                    "course {} has duplicate module order {}",
                    self.id, module.order
                )));
            }
            if !module_ids.insert(&module.id) {
                return Err(CourseError::InvalidCurriculum(format!(
                    "course {} has duplicate module id {}",
                    self.id, module.id
                )));
            }

            let mut lesson_ids = HashSet::new();
            for lesson in &module.lessons {
                if !lesson_ids.insert(&lesson.id) {
                    return Err(CourseError::InvalidCurriculum(format!(
                        "module {} has duplicate lesson id {}",
                        module.id, lesson.id
                    )));
                }

                let mut question_ids = HashSet::new();
                for question in &lesson.questions {
                    if question.points == 0 {
                        return Err(CourseError::InvalidCurriculum(format!(
                            "question {} in lesson {} is worth zero points",
                            question.id, lesson.id
                        )));
                    }
                    if !question_ids.insert(&question.id) {
                        return Err(CourseError::InvalidCurriculum(format!(
                            "lesson {} has duplicate question id {}",
                            lesson.id, question.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
