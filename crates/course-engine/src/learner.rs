//! Learner accounts and the per-learner record persisted by the store.
//!
//! A `LearnerRecord` is the unit of shared mutable state: the learner's
//! points, every enrollment they ever held, and the append-only award log
//! are read and written together in one transaction.

use serde::{Deserialize, Serialize};

use crate::enrollment::Enrollment;
use crate::gamification::PointAward;
use crate::ids::{CourseId, LearnerId};

/// Role reported by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Only students may enroll.
    pub fn may_enroll(&self) -> bool {
        matches!(self, Role::Student)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Parse a lowercase role tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "student" => Some(Role::Student),
            "instructor" => Some(Role::Instructor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Everything stored for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    pub id: LearnerId,
    pub name: String,
    pub role: Role,
    pub points: u64,
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub awards: Vec<PointAward>,
    pub created_at: u64,
}

impl LearnerRecord {
    /// Create a learner with no points and no enrollments.
    pub fn new(id: LearnerId, name: impl Into<String>, role: Role, now: u64) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            points: 0,
            enrollments: Vec::new(),
            awards: Vec::new(),
            created_at: now,
        }
    }

    /// The enrollment for `course`, if any.
    pub fn enrollment(&self, course: &CourseId) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| &e.course_id == course)
    }

    /// Mutable access to the enrollment for `course`.
    pub fn enrollment_mut(&mut self, course: &CourseId) -> Option<&mut Enrollment> {
        self.enrollments.iter_mut().find(|e| &e.course_id == course)
    }

    /// The single enrollment that is still in progress, if any.
    pub fn active_enrollment(&self) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| e.is_active())
    }
}
