//! In-process store for learner records and certificates.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::certificate::{Certificate, CertificateId, CertificateIssue};
use crate::error::{CourseError, Result};
use crate::ids::{CourseId, LearnerId};
use crate::learner::LearnerRecord;

use super::locks::{acquire, KeyedLocks};
use super::ProgressStore;

#[derive(Default)]
struct CertificateTables {
    by_pair: HashMap<(LearnerId, CourseId), CertificateId>,
    by_id: HashMap<CertificateId, Certificate>,
}

/// Memory-backed `ProgressStore`.
///
/// Learner writes are serialized per learner; the shared maps are only
/// locked for the copy-in and copy-out of a record.
#[derive(Default)]
pub struct MemoryStore {
    learners: Mutex<HashMap<LearnerId, LearnerRecord>>,
    learner_locks: KeyedLocks<LearnerId>,
    certificates: Mutex<CertificateTables>,
    certificate_locks: KeyedLocks<(LearnerId, CourseId)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn learners(&self) -> Result<MutexGuard<'_, HashMap<LearnerId, LearnerRecord>>> {
        self.learners
            .lock()
            .map_err(|_| CourseError::StorageError("learner table lock poisoned".to_string()))
    }

    fn certificates(&self) -> Result<MutexGuard<'_, CertificateTables>> {
        self.certificates
            .lock()
            .map_err(|_| CourseError::StorageError("certificate table lock poisoned".to_string()))
    }
}

impl ProgressStore for MemoryStore {
    fn insert_learner(&self, record: LearnerRecord) -> Result<()> {
        let mut learners = self.learners()?;
        if learners.contains_key(&record.id) {
            return Err(CourseError::LearnerExists(record.id.to_string()));
        }
        learners.insert(record.id.clone(), record);
        Ok(())
    }

    fn load_learner(&self, id: &LearnerId) -> Result<LearnerRecord> {
        self.learners()?
            .get(id)
            .cloned()
            .ok_or_else(|| CourseError::LearnerNotFound(id.to_string()))
    }

    fn list_learners(&self) -> Result<Vec<LearnerId>> {
        let mut ids: Vec<LearnerId> = self.learners()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn update_learner<T, F>(&self, id: &LearnerId, f: F) -> Result<T>
    where
        F: FnOnce(&mut LearnerRecord) -> Result<T>,
    {
        let handle = self.learner_locks.handle(id);
        let _guard = acquire(&handle);

        let mut working = self.load_learner(id)?;
        let out = f(&mut working)?;
        self.learners()?.insert(id.clone(), working);
        Ok(out)
    }

    fn find_certificate(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<Option<Certificate>> {
        let tables = self.certificates()?;
        Ok(tables
            .by_pair
            .get(&(learner.clone(), course.clone()))
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    fn load_certificate(&self, id: &CertificateId) -> Result<Certificate> {
        self.certificates()?
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CourseError::CertificateNotFound(id.to_string()))
    }

    fn issue_certificate<F>(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        build: F,
    ) -> Result<CertificateIssue>
    where
        F: FnOnce() -> Result<Certificate>,
    {
        let key = (learner.clone(), course.clone());
        let handle = self.certificate_locks.handle(&key);
        let _guard = acquire(&handle);

        if let Some(existing) = self.find_certificate(learner, course)? {
            return Ok(CertificateIssue {
                certificate: existing,
                newly_issued: false,
            });
        }

        let certificate = build()?;

        let mut tables = self.certificates()?;
        if tables.by_id.contains_key(&certificate.certificate_id) {
            return Err(CourseError::StorageError(format!(
                "certificate id collision: {}",
                certificate.certificate_id
            )));
        }
        tables.by_pair.insert(key, certificate.certificate_id.clone());
        tables.by_id.insert(certificate.certificate_id.clone(), certificate.clone());

        Ok(CertificateIssue {
            certificate,
            newly_issued: true,
        })
    }
}
