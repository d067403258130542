use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::domain::{Answers, CriterionKey, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts ASCII letters, digits, `-` and `_`.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 128
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Persisted form of a session. Sequences are not stored; they are rebuilt from
/// `seed`, `stage` and `answers` on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct SessionSnapshot<K> {
    pub seed: u64,
    pub stage: Stage,
    pub cursor: usize,
    pub answers: Answers,
    #[serde(default)]
    pub weakest_links: Vec<K>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("session snapshot is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("session snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn encode_snapshot<K: CriterionKey>(
    snapshot: &SessionSnapshot<K>,
) -> Result<String, SnapshotError> {
    serde_json::to_string(snapshot).map_err(SnapshotError::Encode)
}

pub fn decode_snapshot<K: CriterionKey>(payload: &str) -> Result<SessionSnapshot<K>, SnapshotError> {
    serde_json::from_str(payload).map_err(SnapshotError::Corrupt)
}

/// Opaque persistence boundary. Payloads are produced by [`encode_snapshot`].
pub trait SessionStore: Send + Sync {
    fn save(&self, id: &SessionId, payload: String) -> Result<(), StoreError>;
    fn load(&self, id: &SessionId) -> Result<Option<String>, StoreError>;
    fn discard(&self, id: &SessionId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session id '{0}' is not usable as a storage key")]
    InvalidId(String),
    #[error("session storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// One JSON file per session under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &SessionId) -> Result<PathBuf, StoreError> {
        if !id.is_valid() {
            return Err(StoreError::InvalidId(id.0.clone()));
        }
        Ok(self.dir.join(format!("{}.json", id.0)))
    }
}

impl SessionStore for JsonFileSessionStore {
    fn save(&self, id: &SessionId, payload: String) -> Result<(), StoreError> {
        let path = self.path(id)?;
        fs::create_dir_all(&self.dir)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        let path = self.path(id)?;
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn discard(&self, id: &SessionId) -> Result<(), StoreError> {
        let path = self.path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
