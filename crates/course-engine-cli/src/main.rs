//! CourseEngine CLI — `cpe` command.
//!
//! Provides a command-line interface for registering learners, enrolling
//! them in courses, recording module completions, grading quizzes, and
//! issuing certificates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use course_engine::time::now_micros;
use course_engine::{
    AssessmentAttempt, Catalog, CertificateId, CourseId, CurriculumStore, FileStore,
    IntegrityFlag, IntegrityFlagKind, LearnerId, LessonId, ModuleId, ProgressStore, QuestionId,
    Registrar, Role,
};

type Engine = Registrar<Catalog, FileStore>;

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --data-dir")?;
    Ok(PathBuf::from(home).join(".course-engine"))
}

// ── Time formatting helpers ───────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// CourseEngine CLI — enroll learners, track module progress, grade quizzes,
/// and issue course certificates.
#[derive(Parser, Debug)]
#[command(
    name = "cpe",
    about = "CourseEngine CLI",
    version,
    long_about = "cpe — CourseEngine CLI\n\nEnroll learners, unlock modules in order, grade quizzes with\nintegrity checks, award points, and issue course certificates."
)]
struct Cli {
    /// Data directory (default: ~/.course-engine)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Curriculum catalog file (default: {data-dir}/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage learner accounts
    Learner {
        #[command(subcommand)]
        subcommand: LearnerCommands,
    },

    /// List courses in the catalog
    Courses,

    /// Enroll a learner in a course
    Enroll {
        /// Learner id
        learner: String,
        /// Course id
        course: String,
    },

    /// Mark a module complete
    Complete {
        /// Learner id
        learner: String,
        /// Course id
        course: String,
        /// Module id
        module: String,
        /// Lesson whose completion finished the module
        #[arg(long)]
        lesson: Option<String>,
    },

    /// Submit a quiz attempt
    Submit {
        /// Learner id
        learner: String,
        /// Course id
        course: String,
        /// Module id
        module: String,
        /// Quiz lesson id
        lesson: String,
        /// Answers as a JSON object (inline, or a path to a JSON file)
        #[arg(long)]
        answers: Option<String>,
        /// A single answer as QUESTION=ANSWER (repeatable)
        #[arg(long = "answer")]
        answer: Vec<String>,
        /// Integrity flag raised during the attempt (tab_switch, focus_lost, copy_attempt)
        #[arg(long = "flag")]
        flags: Vec<String>,
    },

    /// Show progress in a course
    Progress {
        /// Learner id
        learner: String,
        /// Course id
        course: String,
    },

    /// Request, show, or verify certificates
    Certificate {
        #[command(subcommand)]
        subcommand: CertificateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum LearnerCommands {
    /// Register a learner
    Add {
        /// Learner id
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Role (student, instructor, admin)
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Show a learner's points and enrollments
    Show {
        /// Learner id
        id: String,
    },

    /// List all learners
    List,
}

#[derive(Subcommand, Debug)]
enum CertificateCommands {
    /// Issue (or fetch) the certificate for a completed course
    Request {
        /// Learner id
        learner: String,
        /// Course id
        course: String,
    },

    /// Show a certificate
    Show {
        /// Certificate id
        id: String,
    },

    /// Verify a certificate's fingerprint
    Verify {
        /// Certificate id
        id: String,
    },
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let engine = open_engine(cli.data_dir.as_deref(), cli.catalog.as_deref(), cli.verbose)?;
    let out = Output {
        json: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Learner { subcommand } => match subcommand {
            LearnerCommands::Add { id, name, role } => {
                cmd_learner_add(&engine, out, &id, &name, &role)
            }
            LearnerCommands::Show { id } => cmd_learner_show(&engine, out, &id),
            LearnerCommands::List => cmd_learner_list(&engine, out),
        },
        Commands::Courses => cmd_courses(&engine, out),
        Commands::Enroll { learner, course } => cmd_enroll(&engine, out, &learner, &course),
        Commands::Complete {
            learner,
            course,
            module,
            lesson,
        } => cmd_complete(&engine, out, &learner, &course, &module, lesson.as_deref()),
        Commands::Submit {
            learner,
            course,
            module,
            lesson,
            answers,
            answer,
            flags,
        } => {
            let attempt = build_attempt(answers.as_deref(), &answer, &flags)?;
            cmd_submit(&engine, out, &learner, &course, &module, &lesson, &attempt)
        }
        Commands::Progress { learner, course } => cmd_progress(&engine, out, &learner, &course),
        Commands::Certificate { subcommand } => match subcommand {
            CertificateCommands::Request { learner, course } => {
                cmd_certificate_request(&engine, out, &learner, &course)
            }
            CertificateCommands::Show { id } => cmd_certificate_show(&engine, out, &id),
            CertificateCommands::Verify { id } => cmd_certificate_verify(&engine, out, &id),
        },
    }
}

fn open_engine(data_dir: Option<&Path>, catalog: Option<&Path>, verbose: bool) -> Result<Engine> {
    let data_dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_data_dir()?,
    };
    let catalog_path = catalog
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join("catalog.json"));

    let catalog = if catalog_path.exists() {
        Catalog::load(&catalog_path)
            .with_context(|| format!("failed to load catalog {}", catalog_path.display()))?
    } else {
        log::warn!("no catalog at {}; starting empty", catalog_path.display());
        Catalog::new()
    };

    let store = FileStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    if verbose {
        eprintln!("Data dir: {}", data_dir.display());
        eprintln!("Catalog:  {} ({} course(s))", catalog_path.display(), catalog.len());
    }

    Ok(Registrar::new(catalog, store))
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
    verbose: bool,
}

impl Output {
    /// Print `value` as JSON when `--json` is set, otherwise run `human`.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

// ── Attempt parsing ───────────────────────────────────────────────────────────

fn build_attempt(
    answers: Option<&str>,
    pairs: &[String],
    flags: &[String],
) -> Result<AssessmentAttempt> {
    let mut attempt = AssessmentAttempt::new();

    if let Some(raw) = answers {
        let text = if raw.trim_start().starts_with('{') {
            raw.to_string()
        } else {
            std::fs::read_to_string(raw).with_context(|| format!("failed to read {raw}"))?
        };
        let parsed: HashMap<QuestionId, String> =
            serde_json::from_str(&text).context("answers must be a JSON object of strings")?;
        attempt.answers.extend(parsed);
    }

    for pair in pairs {
        let (question, answer) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("--answer expects QUESTION=ANSWER, got '{pair}'"))?;
        attempt = attempt.answer(question, answer);
    }

    let now = now_micros();
    for tag in flags {
        let kind = IntegrityFlagKind::from_tag(tag)
            .ok_or_else(|| anyhow!("unknown integrity flag '{tag}'"))?;
        attempt.integrity_flags.push(IntegrityFlag {
            kind,
            timestamp: now,
        });
    }

    Ok(attempt)
}

// ── Learner commands ──────────────────────────────────────────────────────────

fn cmd_learner_add(engine: &Engine, out: Output, id: &str, name: &str, role: &str) -> Result<()> {
    let role = Role::from_tag(role).ok_or_else(|| anyhow!("unknown role '{role}'"))?;
    let record = engine.register_learner(LearnerId::new(id), name, role)?;

    out.emit(&record, || {
        println!("Registered learner '{}'", record.id);
        println!("  Name: {}", record.name);
        println!("  Role: {}", record.role);
    })
}

fn cmd_learner_show(engine: &Engine, out: Output, id: &str) -> Result<()> {
    let record = engine.learner(&LearnerId::new(id))?;

    out.emit(&record, || {
        println!("Learner: {}", record.id);
        println!("  Name:    {}", record.name);
        println!("  Role:    {}", record.role);
        println!("  Points:  {}", record.points);
        println!("  Created: {}", micros_to_datetime(record.created_at));

        if record.enrollments.is_empty() {
            println!("  Enrollments: none");
        } else {
            println!("  Enrollments ({}):", record.enrollments.len());
            for e in &record.enrollments {
                let status = match e.completed_at {
                    Some(at) => format!("completed {}", micros_to_datetime(at)),
                    None => "active".to_string(),
                };
                println!("    {} — {}% ({status})", e.course_id, e.progress);
            }
        }

        if out.verbose && !record.awards.is_empty() {
            println!("  Awards:");
            for a in &record.awards {
                println!(
                    "    +{:<4} {} ({} / {}) at {}",
                    a.points,
                    a.kind.as_tag(),
                    a.course_id,
                    a.module_id,
                    micros_to_datetime(a.awarded_at)
                );
            }
        }
    })
}

fn cmd_learner_list(engine: &Engine, out: Output) -> Result<()> {
    let ids = engine.store().list_learners()?;

    out.emit(&ids, || {
        if ids.is_empty() {
            println!("No learners registered.");
            return;
        }
        println!("Learners ({}):", ids.len());
        for id in &ids {
            println!("  {id}");
        }
    })
}

fn cmd_courses(engine: &Engine, out: Output) -> Result<()> {
    let catalog = engine.curriculum();
    let mut courses = Vec::new();
    for id in catalog.course_ids() {
        courses.push(catalog.course(&id)?);
    }

    out.emit(&courses, || {
        if courses.is_empty() {
            println!("Catalog is empty.");
            return;
        }
        for course in &courses {
            println!("{} — {}", course.id, course.title);
            for module in course.ordered_modules() {
                println!(
                    "  [{}] {} ({} lesson(s))",
                    module.order,
                    module.id,
                    module.lessons.len()
                );
                if out.verbose {
                    for lesson in &module.lessons {
                        println!("        {} ({})", lesson.id, lesson.kind);
                    }
                }
            }
        }
    })
}

// ── Progression commands ──────────────────────────────────────────────────────

fn cmd_enroll(engine: &Engine, out: Output, learner: &str, course: &str) -> Result<()> {
    let enrollment = engine.enroll(&LearnerId::new(learner), &CourseId::new(course))?;

    out.emit(&enrollment, || {
        println!("Enrolled '{learner}' in '{course}'");
        println!("  Enrolled at: {}", micros_to_datetime(enrollment.enrolled_at));
    })
}

fn cmd_complete(
    engine: &Engine,
    out: Output,
    learner: &str,
    course: &str,
    module: &str,
    lesson: Option<&str>,
) -> Result<()> {
    let lesson = lesson.map(LessonId::new);
    let outcome = engine.complete_module(
        &LearnerId::new(learner),
        &CourseId::new(course),
        &ModuleId::new(module),
        lesson.as_ref(),
    )?;

    out.emit(&outcome, || {
        if outcome.completion.already_completed {
            println!("Module '{module}' was already complete.");
        } else {
            println!("Completed module '{module}'");
        }
        println!("  Progress: {}%", outcome.completion.progress);
        if let Some(ref award) = outcome.award {
            println!("  Awarded:  +{} ({})", award.points, award.kind.as_tag());
        }
        println!("  Points:   {}", outcome.points);
        if outcome.completion.completed_course() {
            println!("  Course '{course}' complete!");
        }
    })
}

fn cmd_submit(
    engine: &Engine,
    out: Output,
    learner: &str,
    course: &str,
    module: &str,
    lesson: &str,
    attempt: &AssessmentAttempt,
) -> Result<()> {
    let outcome = engine.submit_assessment(
        &LearnerId::new(learner),
        &CourseId::new(course),
        &ModuleId::new(module),
        &LessonId::new(lesson),
        attempt,
    )?;

    out.emit(&outcome, || {
        let r = &outcome.result;
        println!("Score: {}/{}", r.score, r.total_points);
        println!("  Correct:    {}", r.correct_answers);
        if r.unanswered > 0 {
            println!("  Unanswered: {}", r.unanswered);
        }
        if r.violation_detected {
            println!(
                "  Integrity violation: {} tab switch(es), {} focus loss(es), {} copy attempt(s)",
                r.integrity.tab_switches, r.integrity.focus_lost, r.integrity.copy_attempts
            );
        }
        println!("  Passed:     {}", if r.passed { "yes" } else { "no" });

        if let Some(ref c) = outcome.completion {
            println!("  Progress:   {}%", c.completion.progress);
            if let Some(ref award) = c.award {
                println!("  Awarded:    +{} ({})", award.points, award.kind.as_tag());
            }
            println!("  Points:     {}", c.points);
        }
    })
}

fn cmd_progress(engine: &Engine, out: Output, learner: &str, course: &str) -> Result<()> {
    let report = engine.progress_report(&LearnerId::new(learner), &CourseId::new(course))?;

    out.emit(&report, || {
        println!("Progress in '{}': {}%", report.course_id, report.progress);
        println!(
            "  Modules:  {}/{} complete",
            report.completed_modules.len(),
            report.total_modules
        );
        println!("  Enrolled: {}", micros_to_datetime(report.enrolled_at));
        match report.completed_at {
            Some(at) => println!("  Completed: {}", micros_to_datetime(at)),
            None => {
                if let Some(ref current) = report.current_module {
                    println!("  Current:  {current}");
                }
                let unlocked: Vec<&str> =
                    report.unlocked_modules.iter().map(|m| m.as_str()).collect();
                println!("  Unlocked: {}", unlocked.join(", "));
            }
        }
    })
}

// ── Certificate commands ──────────────────────────────────────────────────────

fn cmd_certificate_request(
    engine: &Engine,
    out: Output,
    learner: &str,
    course: &str,
) -> Result<()> {
    let issue = engine.request_certificate(&LearnerId::new(learner), &CourseId::new(course))?;

    out.emit(&issue, || {
        let cert = &issue.certificate;
        if issue.newly_issued {
            println!("Issued certificate {}", cert.certificate_id);
        } else {
            println!("Certificate already issued: {}", cert.certificate_id);
        }
        println!("  Issued: {}", micros_to_datetime(cert.issued_at));
    })
}

fn cmd_certificate_show(engine: &Engine, out: Output, id: &str) -> Result<()> {
    let cert = engine.certificate(&CertificateId(id.to_string()))?;

    out.emit(&cert, || {
        println!("Certificate: {}", cert.certificate_id);
        println!("  Learner:    {} ({})", cert.snapshot.learner_name, cert.learner_id);
        println!("  Course:     {} ({})", cert.snapshot.course_title, cert.course_id);
        println!("  Instructor: {}", cert.snapshot.instructor_name);
        println!("  Issued:     {}", micros_to_datetime(cert.issued_at));
        if out.verbose {
            println!("  Fingerprint: {}", cert.fingerprint);
        }
    })
}

fn cmd_certificate_verify(engine: &Engine, out: Output, id: &str) -> Result<()> {
    let verification = engine.verify_certificate(&CertificateId(id.to_string()))?;

    out.emit(&verification, || {
        println!("Certificate {}", verification.certificate_id);
        println!(
            "  Fingerprint: {}",
            if verification.fingerprint_valid { "valid" } else { "INVALID" }
        );
        for e in &verification.errors {
            println!("  Error: {e}");
        }
        println!(
            "  Overall:     {}",
            if verification.is_valid { "VALID" } else { "INVALID" }
        );
    })?;

    if !verification.is_valid {
        return Err(anyhow!("certificate {id} failed verification"));
    }
    Ok(())
}
