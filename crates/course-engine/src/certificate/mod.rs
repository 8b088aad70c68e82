//! Certificate gate — time-gated, idempotent course certificates.
//!
//! The certificate module provides:
//! - Eligibility checks (completed course, seven days since enrollment)
//! - Certificate construction with a name/title/instructor snapshot
//! - Fingerprint verification against tampering

pub mod engine;
pub mod types;

pub use engine::{check_eligibility, days_remaining, fingerprint, issue, verify_certificate};
pub use types::{
    Certificate, CertificateId, CertificateIssue, CertificateSnapshot, CertificateVerification,
    MIN_ENROLLMENT_DAYS,
};
