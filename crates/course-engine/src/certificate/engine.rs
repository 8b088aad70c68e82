//! Certificate engine — eligibility, issuance, fingerprint verification.

use sha2::{Digest, Sha256};

use crate::curriculum::Course;
use crate::enrollment::Enrollment;
use crate::error::{CourseError, Result};
use crate::learner::LearnerRecord;
use crate::time::MICROS_PER_DAY;

use super::types::*;

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Whole days left before `enrollment` may be certified, rounded up.
/// Zero once the waiting period has passed.
pub fn days_remaining(enrollment: &Enrollment, now: u64) -> u64 {
    let required = MIN_ENROLLMENT_DAYS * MICROS_PER_DAY;
    let elapsed = now.saturating_sub(enrollment.enrolled_at);
    let left = required.saturating_sub(elapsed);
    left.div_ceil(MICROS_PER_DAY)
}

/// Check that an enrollment may be certified now.
///
/// The course must be completed and at least seven days must have passed
/// since enrollment.
pub fn check_eligibility(enrollment: &Enrollment, now: u64) -> Result<()> {
    if !enrollment.is_completed() {
        return Err(CourseError::NotCompleted {
            course: enrollment.course_id.to_string(),
        });
    }

    let days = days_remaining(enrollment, now);
    if days > 0 {
        return Err(CourseError::TooEarly {
            days_remaining: days,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// Build a new certificate for an eligible enrollment.
///
/// Does not persist anything; the store decides whether this certificate
/// or an existing one wins.
pub fn issue(learner: &LearnerRecord, course: &Course, now: u64) -> Result<Certificate> {
    let enrollment = learner
        .enrollment(&course.id)
        .ok_or_else(|| CourseError::NotEnrolled {
            learner: learner.id.to_string(),
            course: course.id.to_string(),
        })?;

    check_eligibility(enrollment, now)?;

    let snapshot = CertificateSnapshot {
        learner_name: learner.name.clone(),
        course_title: course.title.clone(),
        instructor_name: course.instructor_name.clone(),
    };

    let mut certificate = Certificate {
        certificate_id: CertificateId::generate(),
        learner_id: learner.id.clone(),
        course_id: course.id.clone(),
        issued_at: now,
        snapshot,
        fingerprint: String::new(),
    };
    certificate.fingerprint = fingerprint(&certificate);

    Ok(certificate)
}

/// Hex SHA-256 over a certificate's identifying fields and snapshot.
///
/// Each field is length-prefixed, so no two field lists share an input.
pub fn fingerprint(certificate: &Certificate) -> String {
    let issued_at = certificate.issued_at.to_string();
    let fields = [
        "certificate",
        certificate.certificate_id.0.as_str(),
        certificate.learner_id.0.as_str(),
        certificate.course_id.0.as_str(),
        issued_at.as_str(),
        certificate.snapshot.learner_name.as_str(),
        certificate.snapshot.course_title.as_str(),
        certificate.snapshot.instructor_name.as_str(),
    ];

    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

/// Check a certificate's fingerprint against its contents at `now`.
pub fn verify_certificate(certificate: &Certificate, now: u64) -> CertificateVerification {
    let mut errors = Vec::new();

    let fingerprint_valid = fingerprint(certificate) == certificate.fingerprint;
    if !fingerprint_valid {
        errors.push("Fingerprint does not match certificate contents".to_string());
    }

    if !certificate.certificate_id.0.starts_with("cert_") {
        errors.push(format!(
            "Malformed certificate id: {}",
            certificate.certificate_id
        ));
    }

    CertificateVerification {
        certificate_id: certificate.certificate_id.clone(),
        fingerprint_valid,
        is_valid: errors.is_empty(),
        verified_at: now,
        errors,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
