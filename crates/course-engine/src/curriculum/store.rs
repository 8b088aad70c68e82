//! Curriculum store interface and the in-memory catalog implementation.
//!
//! The engine only reads curriculum data. The catalog file format is:
//! ```json
//! {
//!     "version": 1,
//!     "courses": [ { ... Course ... } ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CourseError, Result};
use crate::ids::{CourseId, LessonId, ModuleId};

use super::types::{Course, Lesson, Module};

const CATALOG_FILE_VERSION: u32 = 1;

/// Read-only access to the Course → Module → Lesson hierarchy.
///
/// Implementations are assumed internally consistent for the duration of a
/// request.
pub trait CurriculumStore: Send + Sync {
    /// Fetch a course by id.
    fn course(&self, course_id: &CourseId) -> Result<Course>;

    /// The course's modules sorted by `order`.
    fn ordered_modules(&self, course_id: &CourseId) -> Result<Vec<Module>> {
        Ok(self.course(course_id)?.ordered_modules())
    }

    /// Fetch a lesson by its module and lesson ids.
    fn lesson(&self, module_id: &ModuleId, lesson_id: &LessonId) -> Result<Lesson>;
}

/// On-disk wrapper for a catalog of courses.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: u32,
    courses: Vec<Course>,
}

/// In-memory curriculum, optionally loaded from a JSON catalog.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    courses: HashMap<CourseId, Course>,
    /// Module id → owning course.
    module_index: HashMap<ModuleId, CourseId>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of courses.
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Result<Self> {
        let mut catalog = Self::new();
        for course in courses {
            catalog.insert(course)?;
        }
        Ok(catalog)
    }

    /// Add a course. Module ids must be unique across the whole catalog.
    pub fn insert(&mut self, course: Course) -> Result<()> {
        course.validate()?;

        if self.courses.contains_key(&course.id) {
            return Err(CourseError::InvalidCurriculum(format!(
                "duplicate course id {}",
                course.id
            )));
        }
        for module in &course.modules {
            if let Some(owner) = self.module_index.get(&module.id) {
                return Err(CourseError::InvalidCurriculum(format!(
                    "module {} already belongs to course {}",
                    module.id, owner
                )));
            }
        }

        for module in &course.modules {
            self.module_index.insert(module.id.clone(), course.id.clone());
        }
        self.courses.insert(course.id.clone(), course);
        Ok(())
    }

    /// Load a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file: CatalogFile = serde_json::from_slice(&bytes).map_err(|e| {
            CourseError::InvalidFileFormat(format!(
                "failed to parse catalog {}: {e}",
                path.display()
            ))
        })?;

        if file.version != CATALOG_FILE_VERSION {
            return Err(CourseError::InvalidFileFormat(format!(
                "unsupported catalog version {} in {}",
                file.version,
                path.display()
            )));
        }

        Self::from_courses(file.courses)
    }

    /// Write the catalog to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut courses: Vec<Course> = self.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        let file = CatalogFile {
            version: CATALOG_FILE_VERSION,
            courses,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CourseError::SerializationError(e.to_string()))?;
        std::fs::write(path.as_ref(), json.as_bytes())?;
        Ok(())
    }

    /// All course ids, sorted.
    pub fn course_ids(&self) -> Vec<CourseId> {
        let mut ids: Vec<CourseId> = self.courses.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog has no courses.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CurriculumStore for Catalog {
    fn course(&self, course_id: &CourseId) -> Result<Course> {
        self.courses
            .get(course_id)
            .cloned()
            .ok_or_else(|| CourseError::CourseNotFound(course_id.to_string()))
    }

    fn lesson(&self, module_id: &ModuleId, lesson_id: &LessonId) -> Result<Lesson> {
        let course_id = self
            .module_index
            .get(module_id)
            .ok_or_else(|| CourseError::LessonNotFound {
                module: module_id.to_string(),
                lesson: lesson_id.to_string(),
            })?;

        self.courses
            .get(course_id)
            .and_then(|c| c.module(module_id))
            .and_then(|m| m.lesson(lesson_id))
            .cloned()
            .ok_or_else(|| CourseError::LessonNotFound {
                module: module_id.to_string(),
                lesson: lesson_id.to_string(),
            })
    }
}
