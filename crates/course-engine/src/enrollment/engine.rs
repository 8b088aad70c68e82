//! Enrollment engine — admission control.

use crate::error::{CourseError, Result};
use crate::ids::CourseId;
use crate::learner::LearnerRecord;

use super::types::Enrollment;

// ---------------------------------------------------------------------------
// Admit
// ---------------------------------------------------------------------------

/// Admit a learner into a course.
///
/// Only students may enroll, a learner may hold one enrollment per course,
/// and at most one enrollment may be in progress at a time. On success the
/// new enrollment is appended to the record and a copy returned.
pub fn admit(record: &mut LearnerRecord, course_id: &CourseId, now: u64) -> Result<Enrollment> {
    if !record.role.may_enroll() {
        return Err(CourseError::RoleNotPermitted {
            role: record.role.to_string(),
        });
    }

    if record.enrollment(course_id).is_some() {
        return Err(CourseError::AlreadyEnrolled {
            learner: record.id.to_string(),
            course: course_id.to_string(),
        });
    }

    if let Some(active) = record.active_enrollment() {
        return Err(CourseError::ActiveCourseExists {
            learner: record.id.to_string(),
            active_course: active.course_id.to_string(),
        });
    }

    let enrollment = Enrollment::new(course_id.clone(), now);
    record.enrollments.push(enrollment.clone());
    Ok(enrollment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
