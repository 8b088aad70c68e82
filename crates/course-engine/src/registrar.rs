//! Registrar — the request surface of the engine.
//!
//! Ties the curriculum store, the progress store and a clock together and
//! exposes the four request shapes (enroll, complete-module,
//! submit-assessment, request-certificate) plus read-only queries. Every
//! mutation of a learner runs inside one `ProgressStore::update_learner`
//! transaction, so a rejected request never leaves partial state behind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assessment::{self, AssessmentAttempt, AssessmentResult};
use crate::certificate::{
    self, Certificate, CertificateId, CertificateIssue, CertificateVerification,
};
use crate::curriculum::{CurriculumStore, LessonKind, Module};
use crate::enrollment::{self, Enrollment};
use crate::error::{CourseError, Result};
use crate::gamification::{self, PointAward};
use crate::ids::{CourseId, LearnerId, LessonId, ModuleId};
use crate::learner::{LearnerRecord, Role};
use crate::progress::{self, ModuleCompletion, ProgressReport};
use crate::storage::ProgressStore;
use crate::time::{Clock, SystemClock};

/// Outcome of a module completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub completion: ModuleCompletion,
    /// `None` for repeated completions.
    pub award: Option<PointAward>,
    /// Learner's point balance after the request.
    pub points: u64,
}

/// Outcome of an assessment submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub result: AssessmentResult,
    /// Present when the attempt passed and drove a module completion.
    pub completion: Option<CompletionOutcome>,
}

/// Request-level entry point to the engine.
pub struct Registrar<C, S> {
    curriculum: C,
    store: S,
    clock: Arc<dyn Clock>,
}

impl<C: CurriculumStore, S: ProgressStore> Registrar<C, S> {
    /// Create a registrar on the system clock.
    pub fn new(curriculum: C, store: S) -> Self {
        Self::with_clock(curriculum, store, Arc::new(SystemClock))
    }

    /// Create a registrar with an explicit clock.
    pub fn with_clock(curriculum: C, store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            curriculum,
            store,
            clock,
        }
    }

    pub fn curriculum(&self) -> &C {
        &self.curriculum
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> u64 {
        self.clock.now_micros()
    }

    // ── Learners ──────────────────────────────────────────────────────────────

    /// Register a learner account.
    pub fn register_learner(
        &self,
        id: LearnerId,
        name: impl Into<String>,
        role: Role,
    ) -> Result<LearnerRecord> {
        let record = LearnerRecord::new(id, name, role, self.now());
        self.store.insert_learner(record.clone())?;
        log::info!("registered learner {} as {}", record.id, record.role);
        Ok(record)
    }

    /// Load a learner record.
    pub fn learner(&self, id: &LearnerId) -> Result<LearnerRecord> {
        self.store.load_learner(id)
    }

    /// Change a learner's display name. Issued certificates keep the old one.
    pub fn rename_learner(&self, id: &LearnerId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.store.update_learner(id, |record| {
            record.name = name;
            Ok(())
        })
    }

    // ── Enrollment ────────────────────────────────────────────────────────────

    /// Admit a learner into a course.
    pub fn enroll(&self, learner: &LearnerId, course: &CourseId) -> Result<Enrollment> {
        self.curriculum.course(course)?;
        let now = self.now();

        let enrollment = self
            .store
            .update_learner(learner, |record| enrollment::admit(record, course, now))?;

        log::info!("learner {learner} enrolled in course {course}");
        Ok(enrollment)
    }

    /// The learner's in-progress enrollment, if any.
    pub fn active_enrollment(&self, learner: &LearnerId) -> Result<Option<Enrollment>> {
        Ok(self.store.load_learner(learner)?.active_enrollment().cloned())
    }

    /// All of a learner's enrollments in admission order.
    pub fn enrollments(&self, learner: &LearnerId) -> Result<Vec<Enrollment>> {
        Ok(self.store.load_learner(learner)?.enrollments)
    }

    // ── Progress ──────────────────────────────────────────────────────────────

    /// Mark a module complete, awarding points once.
    ///
    /// `completing_lesson` names the lesson whose consumption finished the
    /// module; a project lesson earns the project bonus.
    pub fn complete_module(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        module: &ModuleId,
        completing_lesson: Option<&LessonId>,
    ) -> Result<CompletionOutcome> {
        let modules = self.curriculum.ordered_modules(course)?;
        let now = self.now();

        let outcome = self.store.update_learner(learner, |record| {
            let enrollment = record
                .enrollment_mut(course)
                .ok_or_else(|| not_enrolled(learner, course))?;

            let lesson_kind = completing_kind(&modules, course, module, completing_lesson)?;
            let completion = progress::complete_module(enrollment, &modules, module, now)?;

            let award = gamification::award_for(&completion.events, lesson_kind)
                .map(|kind| gamification::apply_award(record, kind, course, module, now));

            Ok(CompletionOutcome {
                completion,
                award,
                points: record.points,
            })
        })?;

        if outcome.completion.already_completed {
            log::debug!("module {module} already completed by {learner}; nothing to do");
        } else {
            log::info!(
                "learner {learner} completed module {module} of {course} ({}%)",
                outcome.completion.progress
            );
            if outcome.completion.completed_course() {
                log::info!("learner {learner} completed course {course}");
            }
        }

        Ok(outcome)
    }

    /// Enrollment state plus navigation hints.
    pub fn progress_report(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<ProgressReport> {
        let record = self.store.load_learner(learner)?;
        let enrollment = record
            .enrollment(course)
            .ok_or_else(|| not_enrolled(learner, course))?;
        let modules = self.curriculum.ordered_modules(course)?;
        Ok(progress::report(enrollment, &modules))
    }

    // ── Assessment ────────────────────────────────────────────────────────────

    /// Score a quiz attempt; a passing attempt completes its module.
    ///
    /// The module must be unlocked. Resubmitting a completed module's quiz is
    /// scored but awards nothing.
    pub fn submit_assessment(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        module: &ModuleId,
        lesson: &LessonId,
        attempt: &AssessmentAttempt,
    ) -> Result<SubmissionOutcome> {
        let record = self.store.load_learner(learner)?;
        let enrollment = record
            .enrollment(course)
            .ok_or_else(|| not_enrolled(learner, course))?;

        // Locked quizzes are rejected before scoring.
        let modules = self.curriculum.ordered_modules(course)?;
        if !enrollment.has_completed(module) {
            progress::check_unlocked(enrollment, &modules, module)?;
        }

        let quiz = self.curriculum.lesson(module, lesson)?;
        let result = assessment::score_attempt(&quiz, attempt)?;

        if !result.passed {
            log::info!(
                "learner {learner} did not pass lesson {lesson}: {}/{}",
                result.score,
                result.total_points
            );
            return Ok(SubmissionOutcome {
                result,
                completion: None,
            });
        }

        let completion = self.complete_module(learner, course, module, Some(lesson))?;
        Ok(SubmissionOutcome {
            result,
            completion: Some(completion),
        })
    }

    // ── Certificates ──────────────────────────────────────────────────────────

    /// Issue the certificate for a completed course, or return the existing one.
    pub fn request_certificate(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<CertificateIssue> {
        let now = self.now();

        let issue = self.store.issue_certificate(learner, course, || {
            let record = self.store.load_learner(learner)?;
            let course = self.curriculum.course(course)?;
            certificate::issue(&record, &course, now)
        })?;

        if issue.newly_issued {
            log::info!(
                "issued certificate {} to {learner} for {course}",
                issue.certificate.certificate_id
            );
        }
        Ok(issue)
    }

    /// Look up a certificate by id.
    pub fn certificate(&self, id: &CertificateId) -> Result<Certificate> {
        self.store.load_certificate(id)
    }

    /// The certificate issued to `learner` for `course`, if any.
    pub fn find_certificate(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<Option<Certificate>> {
        self.store.find_certificate(learner, course)
    }

    /// Load a certificate and check its fingerprint.
    pub fn verify_certificate(&self, id: &CertificateId) -> Result<CertificateVerification> {
        let cert = self.store.load_certificate(id)?;
        let verification = certificate::verify_certificate(&cert, self.now());
        if !verification.is_valid {
            log::warn!("certificate {id} failed verification: {:?}", verification.errors);
        }
        Ok(verification)
    }
}

fn not_enrolled(learner: &LearnerId, course: &CourseId) -> CourseError {
    CourseError::NotEnrolled {
        learner: learner.to_string(),
        course: course.to_string(),
    }
}

/// Resolve the kind of the completing lesson, checking it belongs to `module`.
fn completing_kind(
    modules: &[Module],
    course: &CourseId,
    module: &ModuleId,
    lesson: Option<&LessonId>,
) -> Result<Option<LessonKind>> {
    let found = modules
        .iter()
        .find(|m| &m.id == module)
        .ok_or_else(|| CourseError::ModuleNotFound {
            course: course.to_string(),
            module: module.to_string(),
        })?;

    match lesson {
        None => Ok(None),
        Some(id) => found
            .lesson(id)
            .map(|l| Some(l.kind))
            .ok_or_else(|| CourseError::LessonNotFound {
                module: module.to_string(),
                lesson: id.to_string(),
            }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
