//! Filesystem-backed store for learner records and certificates.
//!
//! Each record is one JSON file wrapped with a format version:
//! ```json
//! { "version": 1, "learner": { ... LearnerRecord ... } }
//! { "version": 1, "certificate": { ... Certificate ... } }
//! ```
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! crash mid-write leaves the previous version intact.
//!
//! Every learner transaction holds `learners/{id}.lock` from load to rename,
//! and certificate issuance holds `claims/{learner}/{course}.lock`, so
//! writers are serialized across processes as well as threads. A claim file
//! is written in full under a temporary name and hard-linked into place; it
//! is the unique constraint on (learner, course) certificates.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::certificate::{Certificate, CertificateId, CertificateIssue};
use crate::error::{CourseError, Result};
use crate::ids::{CourseId, LearnerId};
use crate::learner::LearnerRecord;

use super::locks::{acquire, KeyedLocks, LockFile};
use super::ProgressStore;

// ── File format constants ─────────────────────────────────────────────────────

const STORE_FILE_VERSION: u32 = 1;

const LEARNERS_DIR: &str = "learners";
const CERTIFICATES_DIR: &str = "certificates";
const CLAIMS_DIR: &str = "claims";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct LearnerFile {
    version: u32,
    learner: LearnerRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct CertificateFile {
    version: u32,
    certificate: Certificate,
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// `ProgressStore` persisted as JSON files under a base directory.
pub struct FileStore {
    base_dir: PathBuf,
    learner_locks: KeyedLocks<LearnerId>,
    certificate_locks: KeyedLocks<(LearnerId, CourseId)>,
    lock_timeout: Duration,
}

impl FileStore {
    /// Open a store rooted at `base_dir`, creating its sub-directories.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(LEARNERS_DIR))?;
        std::fs::create_dir_all(base_dir.join(CERTIFICATES_DIR))?;
        std::fs::create_dir_all(base_dir.join(CLAIMS_DIR))?;
        Ok(Self {
            base_dir,
            learner_locks: KeyedLocks::new(),
            certificate_locks: KeyedLocks::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// How long to wait for a lock file held by another process before
    /// failing with `StorageError`.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Root directory of this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load every certificate on disk, skipping unreadable files.
    pub fn load_all_certificates(&self) -> Result<Vec<Certificate>> {
        let mut certificates = Vec::new();
        for entry in std::fs::read_dir(self.base_dir.join(CERTIFICATES_DIR))? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".json") {
                match self.load_certificate(&CertificateId(stem.to_string())) {
                    Ok(certificate) => certificates.push(certificate),
                    Err(e) => log::warn!("skipping certificate file {name_str}: {e}"),
                }
            }
        }
        Ok(certificates)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn learner_path(&self, id: &LearnerId) -> Result<PathBuf> {
        Ok(self
            .base_dir
            .join(LEARNERS_DIR)
            .join(format!("{}.json", file_safe(id.as_str())?)))
    }

    fn certificate_path(&self, id: &CertificateId) -> Result<PathBuf> {
        Ok(self
            .base_dir
            .join(CERTIFICATES_DIR)
            .join(format!("{}.json", file_safe(&id.0)?)))
    }

    fn claim_path(&self, learner: &LearnerId, course: &CourseId) -> Result<PathBuf> {
        Ok(self
            .base_dir
            .join(CLAIMS_DIR)
            .join(file_safe(learner.as_str())?)
            .join(format!("{}.claim", file_safe(course.as_str())?)))
    }

    fn lock_learner(&self, id: &LearnerId) -> Result<LockFile> {
        let path = self
            .base_dir
            .join(LEARNERS_DIR)
            .join(format!("{}.lock", file_safe(id.as_str())?));
        LockFile::acquire(path, self.lock_timeout)
    }

    fn lock_claim(&self, claim: &Path) -> Result<LockFile> {
        if let Some(parent) = claim.parent() {
            std::fs::create_dir_all(parent)?;
        }
        LockFile::acquire(claim.with_extension("lock"), self.lock_timeout)
    }

    fn read_learner(&self, path: &Path) -> Result<LearnerRecord> {
        let bytes = std::fs::read(path)?;
        let file: LearnerFile = serde_json::from_slice(&bytes).map_err(|e| {
            CourseError::InvalidFileFormat(format!(
                "failed to parse learner file {}: {e}",
                path.display()
            ))
        })?;
        check_version(file.version, path)?;
        Ok(file.learner)
    }

    fn write_learner(&self, record: &LearnerRecord) -> Result<()> {
        let file = LearnerFile {
            version: STORE_FILE_VERSION,
            learner: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CourseError::SerializationError(e.to_string()))?;
        write_atomic(&self.learner_path(&record.id)?, json.as_bytes())
    }

    fn write_certificate(&self, certificate: &Certificate) -> Result<()> {
        let file = CertificateFile {
            version: STORE_FILE_VERSION,
            certificate: certificate.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CourseError::SerializationError(e.to_string()))?;
        write_atomic(
            &self.certificate_path(&certificate.certificate_id)?,
            json.as_bytes(),
        )
    }

    /// The certificate id a claim points at. `None` when the claim is
    /// missing or was left empty by an interrupted writer.
    fn read_claim(&self, path: &Path) -> Result<Option<CertificateId>> {
        match std::fs::read_to_string(path) {
            Ok(id) if id.trim().is_empty() => Ok(None),
            Ok(id) => Ok(Some(CertificateId(id.trim().to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CourseError::Io(e)),
        }
    }

    /// Publish a fully written claim file at `claim`.
    ///
    /// Fails with `AlreadyExists` when another claim is already in place.
    fn publish_claim(&self, claim: &Path, id: &CertificateId) -> std::io::Result<()> {
        let tmp = claim.with_extension(format!(
            "claim-tmp-{}",
            hex::encode(crate::ids::random_bytes::<6>())
        ));
        let result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(id.0.as_bytes())?;
            file.sync_all()?;
            std::fs::hard_link(&tmp, claim)
        })();
        let _ = std::fs::remove_file(&tmp);
        result
    }
}

impl ProgressStore for FileStore {
    fn insert_learner(&self, record: LearnerRecord) -> Result<()> {
        let handle = self.learner_locks.handle(&record.id);
        let _guard = acquire(&handle);
        let _lock = self.lock_learner(&record.id)?;

        if self.learner_path(&record.id)?.exists() {
            return Err(CourseError::LearnerExists(record.id.to_string()));
        }
        self.write_learner(&record)
    }

    fn load_learner(&self, id: &LearnerId) -> Result<LearnerRecord> {
        let path = self.learner_path(id)?;
        if !path.exists() {
            return Err(CourseError::LearnerNotFound(id.to_string()));
        }
        self.read_learner(&path)
    }

    fn list_learners(&self) -> Result<Vec<LearnerId>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(self.base_dir.join(LEARNERS_DIR))? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".json") {
                ids.push(LearnerId::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn update_learner<T, F>(&self, id: &LearnerId, f: F) -> Result<T>
    where
        F: FnOnce(&mut LearnerRecord) -> Result<T>,
    {
        let handle = self.learner_locks.handle(id);
        let _guard = acquire(&handle);
        let _lock = self.lock_learner(id)?;

        let mut working = self.load_learner(id)?;
        let out = f(&mut working)?;
        self.write_learner(&working)?;
        Ok(out)
    }

    fn find_certificate(
        &self,
        learner: &LearnerId,
        course: &CourseId,
    ) -> Result<Option<Certificate>> {
        match self.read_claim(&self.claim_path(learner, course)?)? {
            Some(id) => self.load_certificate(&id).map(Some),
            None => Ok(None),
        }
    }

    fn load_certificate(&self, id: &CertificateId) -> Result<Certificate> {
        let path = self.certificate_path(id)?;
        if !path.exists() {
            return Err(CourseError::CertificateNotFound(id.to_string()));
        }
        let bytes = std::fs::read(&path)?;
        let file: CertificateFile = serde_json::from_slice(&bytes).map_err(|e| {
            CourseError::InvalidFileFormat(format!(
                "failed to parse certificate file {}: {e}",
                path.display()
            ))
        })?;
        check_version(file.version, &path)?;
        Ok(file.certificate)
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

        let claim = self.claim_path(learner, course)?;
        let _lock = self.lock_claim(&claim)?;

        if let Some(existing) = self.find_certificate(learner, course)? {
            return Ok(CertificateIssue {
                certificate: existing,
                newly_issued: false,
            });
        }
        if claim.exists() {
            // Empty claim from an interrupted writer; nobody else holds the lock.
            log::warn!("removing abandoned claim {}", claim.display());
            std::fs::remove_file(&claim)?;
        }

        let certificate = build()?;
        if self.certificate_path(&certificate.certificate_id)?.exists() {
            return Err(CourseError::StorageError(format!(
                "certificate id collision: {}",
                certificate.certificate_id
            )));
        }
        self.write_certificate(&certificate)?;

        match self.publish_claim(&claim, &certificate.certificate_id) {
            Ok(()) => Ok(CertificateIssue {
                certificate,
                newly_issued: true,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Claimed by a writer that ignores the lock file; keep theirs.
                let _ = std::fs::remove_file(self.certificate_path(&certificate.certificate_id)?);
                let winner = self.read_claim(&claim)?.ok_or_else(|| {
                    CourseError::StorageError(format!("empty claim {}", claim.display()))
                })?;
                Ok(CertificateIssue {
                    certificate: self.load_certificate(&winner)?,
                    newly_issued: false,
                })
            }
            Err(e) => {
                let _ = std::fs::remove_file(self.certificate_path(&certificate.certificate_id)?);
                Err(CourseError::Io(e))
            }
        }
    }
}

// ── Free helpers ──────────────────────────────────────────────────────────────

/// Reject ids that cannot be used verbatim as file names.
fn file_safe(id: &str) -> Result<&str> {
    let ok = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(id)
    } else {
        Err(CourseError::StorageError(format!(
            "identifier not usable as a file name: {id:?}"
        )))
    }
}

fn check_version(version: u32, path: &Path) -> Result<()> {
    if version == STORE_FILE_VERSION {
        Ok(())
    } else {
        Err(CourseError::InvalidFileFormat(format!(
            "unsupported version {version} in {}",
            path.display()
        )))
    }
}

/// Write `bytes` to a temporary sibling, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension(format!("tmp-{}", hex::encode(crate::ids::random_bytes::<6>())));
    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(CourseError::Io(e));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
