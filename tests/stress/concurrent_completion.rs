//! Concurrency test: racing completions and certificate requests.
//!
//! Validates that repeated requests for the same learner never double-append
//! a module, never double-award points, and converge on one certificate,
//! including when each writer opens its own `FileStore` on a shared directory.

use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use course_engine::time::MICROS_PER_DAY;
use course_engine::{
    Catalog, Course, CourseId, CurriculumStore, FileStore, LearnerId, LearnerRecord, Lesson,
    LessonId, LessonKind, ManualClock, MemoryStore, Module, ModuleId, ProgressStore, Registrar,
    Role,
};

const T0: u64 = 1_750_000_000_000_000;

fn course(id: &str, modules: u32) -> Course {
    Course {
        id: CourseId::new(id),
        title: format!("Course {id}"),
        instructor_name: "Pat".into(),
        modules: (1..=modules)
            .map(|i| Module {
                id: ModuleId::new(format!("{id}-m{i}")),
                title: format!("Module {i}"),
                order: i,
                lessons: vec![Lesson {
                    id: LessonId::new("l"),
                    title: "Lesson".into(),
                    kind: LessonKind::Text,
                    questions: Vec::new(),
                }],
            })
            .collect(),
    }
}

fn enrolled<S: ProgressStore>(
    store: S,
    learners: &[&str],
    clock: Arc<ManualClock>,
) -> Arc<Registrar<Catalog, S>> {
    let catalog = Catalog::from_courses([course("c", 3)]).unwrap();
    let registrar = Registrar::with_clock(catalog, store, clock);
    for id in learners {
        let id = LearnerId::new(*id);
        registrar
            .register_learner(id.clone(), id.as_str(), Role::Student)
            .unwrap();
        registrar.enroll(&id, &CourseId::new("c")).unwrap();
    }
    Arc::new(registrar)
}

/// Race `threads` completions of every module, in order, for one learner.
fn race_completions<C: CurriculumStore + 'static, S: ProgressStore + 'static>(
    registrar: Arc<Registrar<C, S>>,
    learner: &str,
    threads: usize,
) -> usize {
    let modules: Vec<ModuleId> = (1..=3).map(|i| ModuleId::new(format!("c-m{i}"))).collect();
    let awarded = Arc::new(Mutex::new(0usize));

    for module in modules {
        let barrier = Arc::new(Barrier::new(threads));
        let mut handles = Vec::new();
        for _ in 0..threads {
            let registrar = Arc::clone(&registrar);
            let barrier = Arc::clone(&barrier);
            let awarded = Arc::clone(&awarded);
            let module = module.clone();
            let learner = LearnerId::new(learner);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let outcome = registrar
                    .complete_module(&learner, &CourseId::new("c"), &module, None)
                    .expect("completion should succeed");
                if outcome.award.is_some() {
                    *awarded.lock().unwrap() += 1;
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }

    let n = *awarded.lock().unwrap();
    n
}

#[test]
fn stress_32_threads_complete_same_module() {
    let clock = Arc::new(ManualClock::new(T0));
    let registrar = enrolled(MemoryStore::new(), &["racer"], clock);

    let awarded = race_completions(Arc::clone(&registrar), "racer", 32);
    assert_eq!(awarded, 3, "each module is awarded exactly once");

    let record = registrar.learner(&LearnerId::new("racer")).unwrap();
    let enrollment = &record.enrollments[0];
    assert_eq!(enrollment.completed_modules.len(), 3);
    assert_eq!(enrollment.history.len(), 3);
    assert_eq!(enrollment.progress, 100);
    assert_eq!(record.awards.len(), 3);
    assert_eq!(record.points, 10 + 10 + 100);
}

#[test]
fn stress_file_store_racing_completions() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let registrar = enrolled(FileStore::open(dir.path()).unwrap(), &["disk"], clock);

    let awarded = race_completions(Arc::clone(&registrar), "disk", 16);
    assert_eq!(awarded, 3);

    let reopened = FileStore::open(dir.path()).unwrap();
    let record = reopened.load_learner(&LearnerId::new("disk")).unwrap();
    assert_eq!(record.enrollments[0].completed_modules.len(), 3);
    assert_eq!(record.points, 120);
}

#[test]
fn stress_many_learners_in_parallel() {
    let names: Vec<String> = (0..40).map(|i| format!("learner-{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let clock = Arc::new(ManualClock::new(T0));
    let registrar = enrolled(MemoryStore::new(), &refs, clock);

    let mut handles = Vec::new();
    for name in names.clone() {
        let registrar = Arc::clone(&registrar);
        handles.push(thread::spawn(move || {
            let learner = LearnerId::new(name);
            for i in 1..=3 {
                registrar
                    .complete_module(
                        &learner,
                        &CourseId::new("c"),
                        &ModuleId::new(format!("c-m{i}")),
                        None,
                    )
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    for name in &names {
        let record = registrar.learner(&LearnerId::new(name.as_str())).unwrap();
        assert_eq!(record.points, 120, "{name} should have 120 points");
        assert!(record.enrollments[0].is_completed());
    }
}

/// Complete the course, wait out the period, then race `threads` requests.
fn race_certificates<S: ProgressStore + 'static>(
    store: S,
    threads: usize,
) -> Arc<Registrar<Catalog, S>> {
    let clock = Arc::new(ManualClock::new(T0));
    let registrar = enrolled(store, &["grad"], clock.clone());
    let learner = LearnerId::new("grad");
    let course = CourseId::new("c");
    for i in 1..=3 {
        registrar
            .complete_module(&learner, &course, &ModuleId::new(format!("c-m{i}")), None)
            .unwrap();
    }
    clock.advance(7 * MICROS_PER_DAY);

    let barrier = Arc::new(Barrier::new(threads));
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let registrar = Arc::clone(&registrar);
        let barrier = Arc::clone(&barrier);
        let results = Arc::clone(&results);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let issue = registrar
                .request_certificate(&LearnerId::new("grad"), &CourseId::new("c"))
                .expect("eligible request should succeed");
            results.lock().unwrap().push(issue);
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let results = results.lock().unwrap();
    assert_eq!(results.len(), threads);

    let ids: HashSet<_> = results
        .iter()
        .map(|r| r.certificate.certificate_id.clone())
        .collect();
    assert_eq!(ids.len(), 1, "all requests converge on one certificate");

    let fresh = results.iter().filter(|r| r.newly_issued).count();
    assert_eq!(fresh, 1, "exactly one request issues");

    registrar
}

#[test]
fn stress_32_racing_certificate_requests() {
    let registrar = race_certificates(MemoryStore::new(), 32);
    let cert = registrar
        .find_certificate(&LearnerId::new("grad"), &CourseId::new("c"))
        .unwrap()
        .expect("certificate stored");
    assert!(registrar.verify_certificate(&cert.certificate_id).unwrap().is_valid);
}

#[test]
fn stress_file_store_racing_certificate_requests() {
    let dir = tempfile::tempdir().unwrap();
    let registrar = race_certificates(FileStore::open(dir.path()).unwrap(), 16);

    let certificates = registrar.store().load_all_certificates().unwrap();
    assert_eq!(certificates.len(), 1, "losing writers clean up after themselves");

    let reopened = FileStore::open(dir.path()).unwrap();
    let found = reopened
        .find_certificate(&LearnerId::new("grad"), &CourseId::new("c"))
        .unwrap()
        .unwrap();
    assert_eq!(found, certificates[0]);
}

#[test]
fn stress_separate_file_store_handles_keep_every_write() {
    let dir = tempfile::tempdir().unwrap();
    let id = LearnerId::new("shared");
    FileStore::open(dir.path())
        .unwrap()
        .insert_learner(LearnerRecord::new(id.clone(), "Shared", Role::Student, T0))
        .unwrap();

    // One handle per thread, as separate `cpe` processes would have.
    let threads = 8;
    let rounds = 25;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let path = dir.path().to_path_buf();
        let barrier = Arc::clone(&barrier);
        let id = id.clone();
        handles.push(thread::spawn(move || {
            let store = FileStore::open(path).unwrap();
            barrier.wait();
            for _ in 0..rounds {
                store
                    .update_learner(&id, |r| {
                        r.points += 1;
                        Ok(())
                    })
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let record = FileStore::open(dir.path()).unwrap().load_learner(&id).unwrap();
    assert_eq!(record.points, (threads * rounds) as u64);
}

#[test]
fn stress_separate_registrars_converge_on_one_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let setup = enrolled(FileStore::open(dir.path()).unwrap(), &["grad"], clock.clone());
    for i in 1..=3 {
        setup
            .complete_module(
                &LearnerId::new("grad"),
                &CourseId::new("c"),
                &ModuleId::new(format!("c-m{i}")),
                None,
            )
            .unwrap();
    }
    clock.advance(7 * MICROS_PER_DAY);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let path = dir.path().to_path_buf();
        let clock = clock.clone();
        let barrier = Arc::clone(&barrier);
        let results = Arc::clone(&results);
        handles.push(thread::spawn(move || {
            let registrar = Registrar::with_clock(
                Catalog::from_courses([course("c", 3)]).unwrap(),
                FileStore::open(path).unwrap(),
                clock,
            );
            barrier.wait();
            let issue = registrar
                .request_certificate(&LearnerId::new("grad"), &CourseId::new("c"))
                .expect("eligible request should succeed");
            results.lock().unwrap().push(issue);
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let results = results.lock().unwrap();
    let ids: HashSet<_> = results
        .iter()
        .map(|r| r.certificate.certificate_id.clone())
        .collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(results.iter().filter(|r| r.newly_issued).count(), 1);
    assert_eq!(setup.store().load_all_certificates().unwrap().len(), 1);
}
