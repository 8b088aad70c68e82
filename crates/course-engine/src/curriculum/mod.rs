//! Curriculum — the read-only Course → Module → Lesson hierarchy.
//!
//! The curriculum module provides:
//! - Course, module, lesson and question types
//! - The `CurriculumStore` trait the engine reads through
//! - `Catalog`, an in-memory store loadable from a JSON file

pub mod store;
pub mod types;

pub use store::{Catalog, CurriculumStore};
pub use types::{Course, Lesson, LessonKind, Module, Question};
