//! Storage layer for learner records and certificates.
//!
//! Learner state (points, enrollments, awards) is written as one record per
//! learner inside a per-learner transaction. Certificates are created
//! through an insert-if-absent keyed by (learner, course).
//!
//! # Directory layout
//!
//! The filesystem store uses, under its base directory:
//!
//! ```text
//! {base_dir}/
//! ├── learners/
//! │   └── {learner_id}.json
//! ├── certificates/
//! │   └── {certificate_id}.json
//! └── claims/
//!     └── {learner_id}/
//!         └── {course_id}.claim
//! ```
//!
//! # Modules
//!
//! - [`memory_store`] — in-process store for tests and embedding.
//! - [`file_store`] — JSON files with atomic replace-on-write.

pub mod file_store;
pub mod memory_store;

mod locks;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::certificate::{Certificate, CertificateId, CertificateIssue};
use crate::error::Result;
use crate::ids::{CourseId, LearnerId};
use crate::learner::LearnerRecord;

/// Persistence for learner records and certificates.
///
/// Every read reflects the latest committed write; there is no cache.
pub trait ProgressStore: Send + Sync {
    /// Store a new learner. Fails with `LearnerExists` if the id is taken.
    fn insert_learner(&self, record: LearnerRecord) -> Result<()>;

    /// Load a learner record.
    fn load_learner(&self, id: &LearnerId) -> Result<LearnerRecord>;

    /// Ids of all stored learners.
    fn list_learners(&self) -> Result<Vec<LearnerId>>;

    /// Read-modify-write a learner record under that learner's lock.
    ///
    /// `f` runs on a working copy. The copy is committed only when `f`
    /// returns `Ok`; on error the stored record is left untouched.
    fn update_learner<T, F>(&self, id: &LearnerId, f: F) -> Result<T>
    where
        F: FnOnce(&mut LearnerRecord) -> Result<T>;

    /// The certificate for (learner, course), if one was issued.
    fn find_certificate(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<Option<Certificate>>;

    /// Load a certificate by id.
    fn load_certificate(&self, id: &CertificateId) -> Result<Certificate>;

    /// Return the existing certificate for (learner, course), or persist
    /// the one produced by `build`.
    ///
    /// Concurrent calls for the same pair converge on a single certificate;
    /// `build` is not called when one already exists.
    fn issue_certificate<F>(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        build: F,
    ) -> Result<CertificateIssue>
    where
        F: FnOnce() -> Result<Certificate>;
}
