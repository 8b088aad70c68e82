//! CourseEngine — course progression and assessment for learning platforms.
//!
//! Admits learners into courses, unlocks modules strictly in order, scores
//! multiple-choice quizzes with an integrity veto, awards points exactly
//! once per completion, and issues time-gated certificates.

pub mod assessment;
pub mod certificate;
pub mod curriculum;
pub mod enrollment;
pub mod error;
pub mod gamification;
pub mod ids;
pub mod integrity;
pub mod learner;
pub mod progress;
pub mod registrar;
pub mod storage;
pub mod time;

// Re-export primary types
pub use error::{CourseError, Result};
pub use ids::{CourseId, LearnerId, LessonId, ModuleId, QuestionId};
pub use learner::{LearnerRecord, Role};
pub use registrar::{CompletionOutcome, Registrar, SubmissionOutcome};

// Re-export curriculum types
pub use curriculum::{Catalog, Course, CurriculumStore, Lesson, LessonKind, Module, Question};

// Re-export progression types
pub use enrollment::Enrollment;
pub use progress::{ModuleCompletion, ProgressEvent, ProgressReport};

// Re-export assessment types
pub use assessment::{AssessmentAttempt, AssessmentResult};
pub use integrity::{IntegrityFlag, IntegrityFlagKind, IntegrityMonitor, IntegritySummary};

// Re-export reward and certificate types
pub use certificate::{Certificate, CertificateId, CertificateIssue, CertificateVerification};
pub use gamification::{AwardKind, PointAward};

// Re-export storage
pub use storage::{FileStore, MemoryStore, ProgressStore};
pub use time::{Clock, ManualClock, SystemClock};
