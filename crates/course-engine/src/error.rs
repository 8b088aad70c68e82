//! Error types for the course engine.
//!
//! Domain rejections (enrollment rules, sequencing, eligibility) are
//! expected, recoverable outcomes surfaced verbatim to callers.
//! Infrastructure failures are kept in separate variants so callers can
//! tell "the request was refused" apart from "the store is unavailable".

/// Course engine error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Learner {learner} is not enrolled in course {course}")]
    NotEnrolled { learner: String, course: String },

    #[error("Learner {learner} is already enrolled in course {course}")]
    AlreadyEnrolled { learner: String, course: String },

    #[error("Learner {learner} still has course {active_course} in progress")]
    ActiveCourseExists {
        learner: String,
        active_course: String,
    },

    #[error("Module {module} is locked until module {previous} is completed")]
    SequenceViolation { module: String, previous: String },

    #[error("Module {module} does not belong to course {course}")]
    ModuleNotFound { course: String, module: String },

    #[error("Course {course} is not completed yet")]
    NotCompleted { course: String },

    #[error("Certificate not available yet: {days_remaining} day(s) remaining")]
    TooEarly { days_remaining: u64 },

    #[error("Role '{role}' is not permitted to enroll")]
    RoleNotPermitted { role: String },

    #[error("Invalid assessment attempt: {0}")]
    InvalidAttempt(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Lesson {lesson} not found in module {module}")]
    LessonNotFound { module: String, lesson: String },

    #[error("Learner not found: {0}")]
    LearnerNotFound(String),

    #[error("Learner already registered: {0}")]
    LearnerExists(String),

    #[error("Certificate not found: {0}")]
    CertificateNotFound(String),

    #[error("Invalid curriculum: {0}")]
    InvalidCurriculum(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CourseError {
    /// Whether this is an expected domain rejection rather than an
    /// infrastructure failure.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            CourseError::InvalidCurriculum(_)
                | CourseError::StorageError(_)
                | CourseError::SerializationError(_)
                | CourseError::InvalidFileFormat(_)
                | CourseError::Io(_)
        )
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CourseError>;
