//! Data structures for course certificates.

use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, LearnerId};

/// Days that must pass between enrollment and certification.
pub const MIN_ENROLLMENT_DAYS: u64 = 7;

/// Globally unique, opaque certificate identifier.
///
/// Format: `cert_` + base58 of 16 random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(pub String);

impl CertificateId {
    /// Mint a fresh id.
    pub fn generate() -> Self {
        Self(crate::ids::mint("cert"))
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names captured at issuance so later edits never alter the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSnapshot {
    pub learner_name: String,
    pub course_title: String,
    pub instructor_name: String,
}

/// An issued certificate. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_id: CertificateId,
    pub learner_id: LearnerId,
    pub course_id: CourseId,
    pub issued_at: u64,
    pub snapshot: CertificateSnapshot,
    /// Hex SHA-256 over the fields above.
    pub fingerprint: String,
}

/// Result of checking a certificate's fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateVerification {
    pub certificate_id: CertificateId,
    pub fingerprint_valid: bool,
    pub is_valid: bool,
    pub verified_at: u64,
    pub errors: Vec<String>,
}

/// Outcome of a certificate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateIssue {
    pub certificate: Certificate,
    /// False when an existing certificate was returned.
    pub newly_issued: bool,
}
