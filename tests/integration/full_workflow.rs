//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Register a learner
//! 2. Enroll in a two-module course
//! 3. Complete the text module
//! 4. Pass the quiz module
//! 5. Wait out the certificate period
//! 6. Issue, re-request and verify the certificate
//! 7. Move on to the next course

use std::sync::Arc;

use course_engine::certificate::MIN_ENROLLMENT_DAYS;
use course_engine::gamification::{COURSE_COMPLETION_POINTS, MODULE_COMPLETION_POINTS};
use course_engine::{
    AssessmentAttempt, AwardKind, Catalog, Course, CourseError, CourseId, IntegrityFlagKind,
    IntegrityMonitor, LearnerId, Lesson, LessonId, LessonKind, ManualClock, MemoryStore, Module,
    ModuleId, ProgressEvent, Question, QuestionId, Registrar, Role,
};

const T0: u64 = 1_750_000_000_000_000;

fn question(id: &str, correct: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        text: format!("Question {id}"),
        options: vec!["a".into(), "b".into(), "c".into()],
        correct_answer: correct.into(),
        points: 10,
    }
}

fn intro_course() -> Course {
    Course {
        id: CourseId::new("intro"),
        title: "Introduction".into(),
        instructor_name: "Ada".into(),
        modules: vec![
            Module {
                id: ModuleId::new("intro-m2"),
                title: "Quiz".into(),
                order: 2,
                lessons: vec![Lesson {
                    id: LessonId::new("quiz"),
                    title: "Check your understanding".into(),
                    kind: LessonKind::Mcq,
                    questions: vec![question("q1", "a"), question("q2", "c")],
                }],
            },
            Module {
                id: ModuleId::new("intro-m1"),
                title: "Reading".into(),
                order: 1,
                lessons: vec![Lesson {
                    id: LessonId::new("read"),
                    title: "Read this".into(),
                    kind: LessonKind::Text,
                    questions: Vec::new(),
                }],
            },
        ],
    }
}

fn followup_course() -> Course {
    Course {
        id: CourseId::new("followup"),
        title: "Follow-up".into(),
        instructor_name: "Ada".into(),
        modules: vec![Module {
            id: ModuleId::new("followup-m1"),
            title: "Watch".into(),
            order: 1,
            lessons: vec![Lesson {
                id: LessonId::new("watch"),
                title: "Watch this".into(),
                kind: LessonKind::Video,
                questions: Vec::new(),
            }],
        }],
    }
}

#[test]
fn full_workflow_enrollment_to_certificate() {
    let clock = Arc::new(ManualClock::new(T0));
    let catalog = Catalog::from_courses([intro_course(), followup_course()]).unwrap();
    let registrar = Registrar::with_clock(catalog, MemoryStore::new(), clock.clone());

    let learner = LearnerId::new("learner-1");
    let course = CourseId::new("intro");
    let m1 = ModuleId::new("intro-m1");
    let m2 = ModuleId::new("intro-m2");

    // ── Step 1: Register ────────────────────────────────────────────────
    let record = registrar
        .register_learner(learner.clone(), "Lin", Role::Student)
        .expect("registration should succeed");
    assert_eq!(record.points, 0);
    assert!(record.enrollments.is_empty());

    // ── Step 2: Enroll ──────────────────────────────────────────────────
    let enrollment = registrar.enroll(&learner, &course).unwrap();
    assert_eq!(enrollment.progress, 0);
    assert_eq!(enrollment.enrolled_at, T0);
    assert!(enrollment.completed_at.is_none());

    let report = registrar.progress_report(&learner, &course).unwrap();
    assert_eq!(report.current_module, Some(m1.clone()));
    assert_eq!(report.unlocked_modules, vec![m1.clone()]);

    // The quiz is locked until the reading is done.
    let attempt = AssessmentAttempt::new().answer("q1", "a").answer("q2", "c");
    let err = registrar
        .submit_assessment(&learner, &course, &m2, &LessonId::new("quiz"), &attempt)
        .unwrap_err();
    assert!(matches!(err, CourseError::SequenceViolation { .. }));

    // ── Step 3: Complete the text module ────────────────────────────────
    clock.advance_days(1);
    let outcome = registrar
        .complete_module(&learner, &course, &m1, Some(&LessonId::new("read")))
        .unwrap();
    assert_eq!(outcome.completion.progress, 50);
    assert_eq!(
        outcome.completion.events,
        vec![ProgressEvent::ModuleCompleted {
            course_id: course.clone(),
            module_id: m1.clone(),
        }]
    );
    assert_eq!(outcome.points, MODULE_COMPLETION_POINTS);

    // ── Step 4: Pass the quiz ───────────────────────────────────────────
    let mut monitor = IntegrityMonitor::new();
    assert!(!monitor.has_violation());
    let attempt = attempt.with_monitor(std::mem::take(&mut monitor));

    let submission = registrar
        .submit_assessment(&learner, &course, &m2, &LessonId::new("quiz"), &attempt)
        .unwrap();
    assert_eq!(submission.result.score, 20);
    assert_eq!(submission.result.total_points, 20);
    assert!(submission.result.passed);
    assert!(!submission.result.violation_detected);

    let done = submission.completion.expect("passing quiz completes the module");
    assert_eq!(done.completion.progress, 100);
    assert!(done.completion.completed_at.is_some());
    assert!(done.completion.completed_course());

    let award = done.award.expect("course completion is awarded");
    assert_eq!(award.kind, AwardKind::CourseCompletion);
    assert_eq!(award.points, COURSE_COMPLETION_POINTS);
    assert_eq!(done.points, MODULE_COMPLETION_POINTS + COURSE_COMPLETION_POINTS);

    // ── Step 5: Certificate waiting period ──────────────────────────────
    let err = registrar.request_certificate(&learner, &course).unwrap_err();
    assert!(
        matches!(err, CourseError::TooEarly { days_remaining: 6 }),
        "one day has passed since enrollment, got {err:?}"
    );

    clock.advance_days(MIN_ENROLLMENT_DAYS - 1);

    // ── Step 6: Issue, re-request, verify ───────────────────────────────
    let issue = registrar.request_certificate(&learner, &course).unwrap();
    assert!(issue.newly_issued);
    let cert = issue.certificate;
    assert!(cert.certificate_id.0.starts_with("cert_"));
    assert_eq!(cert.learner_id, learner);
    assert_eq!(cert.course_id, course);
    assert_eq!(cert.snapshot.learner_name, "Lin");
    assert_eq!(cert.snapshot.course_title, "Introduction");
    assert_eq!(cert.snapshot.instructor_name, "Ada");

    let again = registrar.request_certificate(&learner, &course).unwrap();
    assert!(!again.newly_issued);
    assert_eq!(again.certificate, cert);

    let verification = registrar.verify_certificate(&cert.certificate_id).unwrap();
    assert!(verification.is_valid);
    assert!(verification.fingerprint_valid);
    assert!(verification.errors.is_empty());

    // ── Step 7: Next course ─────────────────────────────────────────────
    assert!(registrar.active_enrollment(&learner).unwrap().is_none());
    let next = CourseId::new("followup");
    registrar.enroll(&learner, &next).unwrap();
    assert_eq!(
        registrar.active_enrollment(&learner).unwrap().unwrap().course_id,
        next
    );

    let err = registrar.enroll(&learner, &course).unwrap_err();
    assert!(matches!(err, CourseError::AlreadyEnrolled { .. }));

    let record = registrar.learner(&learner).unwrap();
    assert_eq!(record.enrollments.len(), 2);
    assert_eq!(record.awards.len(), 2);
    assert_eq!(record.points, 110);
}

#[test]
fn full_workflow_retry_after_failed_quiz() {
    let clock = Arc::new(ManualClock::new(T0));
    let catalog = Catalog::from_courses([intro_course()]).unwrap();
    let registrar = Registrar::with_clock(catalog, MemoryStore::new(), clock.clone());

    let learner = LearnerId::new("learner-2");
    let course = CourseId::new("intro");
    let m2 = ModuleId::new("intro-m2");
    let quiz = LessonId::new("quiz");

    registrar
        .register_learner(learner.clone(), "Kim", Role::Student)
        .unwrap();
    registrar.enroll(&learner, &course).unwrap();
    registrar
        .complete_module(&learner, &course, &ModuleId::new("intro-m1"), None)
        .unwrap();

    // 10/20 = 50%: below threshold.
    let half = AssessmentAttempt::new().answer("q1", "a").answer("q2", "b");
    let first = registrar
        .submit_assessment(&learner, &course, &m2, &quiz, &half)
        .unwrap();
    assert_eq!(first.result.score, 10);
    assert!(!first.result.passed);
    assert!(first.completion.is_none());

    // Perfect score with a copy attempt is vetoed.
    let mut monitor = IntegrityMonitor::new();
    monitor.record(IntegrityFlagKind::CopyAttempt, T0 + 5);
    let flagged = AssessmentAttempt::new()
        .answer("q1", "a")
        .answer("q2", "c")
        .with_monitor(monitor);
    let second = registrar
        .submit_assessment(&learner, &course, &m2, &quiz, &flagged)
        .unwrap();
    assert!(second.result.raw_pass());
    assert!(!second.result.passed);
    assert_eq!(second.result.integrity.copy_attempts, 1);

    let report = registrar.progress_report(&learner, &course).unwrap();
    assert_eq!(report.progress, 50);
    assert_eq!(report.current_module, Some(m2.clone()));

    // Clean retry passes.
    let clean = AssessmentAttempt::new().answer("q1", "a").answer("q2", "c");
    let third = registrar
        .submit_assessment(&learner, &course, &m2, &quiz, &clean)
        .unwrap();
    assert!(third.result.passed);
    assert_eq!(third.completion.unwrap().completion.progress, 100);

    // Resubmitting after completion is scored but awards nothing.
    let fourth = registrar
        .submit_assessment(&learner, &course, &m2, &quiz, &clean)
        .unwrap();
    let repeat = fourth.completion.unwrap();
    assert!(repeat.completion.already_completed);
    assert!(repeat.award.is_none());
    assert_eq!(registrar.learner(&learner).unwrap().points, 110);
}
