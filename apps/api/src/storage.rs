//! Persistence sink for finished screenings.
//!
//! Records are immutable once written: each `candidate_id` maps to exactly one
//! file. Ids only have one-second resolution, so a save whose id is taken is
//! stored under the next free `_<n>` suffix instead of touching the existing file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::models::candidate::CandidateRecord;

/// Upper bound on `_<n>` suffixes tried for one base id.
const MAX_ID_SUFFIX: u32 = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No free record id for '{0}'")]
    AlreadyExists(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Id and location of a stored record. The id may carry a `_<n>` suffix when
/// the record's own id was already taken.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
    pub candidate_id: String,
    pub path: PathBuf,
}

/// Where finished candidate records go.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Persists `record` and returns the id and path it landed under.
    async fn save(&self, record: &CandidateRecord) -> Result<SavedRecord, StorageError>;
}

/// Writes one pretty-printed JSON file per record: `<dir>/<candidate_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CandidateStore for JsonFileStore {
    async fn save(&self, record: &CandidateRecord) -> Result<SavedRecord, StorageError> {
        fs::create_dir_all(&self.dir).await?;

        for n in 1..=MAX_ID_SUFFIX {
            let candidate_id = match n {
                1 => record.candidate_id.clone(),
                n => format!("{}_{n}", record.candidate_id),
            };
            let path = self.dir.join(format!("{candidate_id}.json"));
            let stored = CandidateRecord {
                candidate_id: candidate_id.clone(),
                ..record.clone()
            };
            let body = serde_json::to_vec_pretty(&stored)?;

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Record id {candidate_id} taken, trying next suffix");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(&body).await?;
            file.flush().await?;

            info!("Saved candidate record to {}", path.display());
            return Ok(SavedRecord { candidate_id, path });
        }

        Err(StorageError::AlreadyExists(record.candidate_id.clone()))
    }
}
