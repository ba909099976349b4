//! Record storage contracts and the JSON file implementation.
//!
//! # Responsibility
//! - Own the live registry of records keyed by `"<kind>.<id>"`.
//! - Persist the whole registry to, and reload it from, one backing file.
//!
//! # Invariants
//! - Lookup misses return `None`; they are never storage errors.
//! - A failed persist leaves the previous file contents intact, and nothing
//!   unreadable by reload is ever written.
//! - A failed reload leaves the live registry unchanged.

use crate::model::kind::RecordKind;
use crate::model::record::{Record, RecordError};
use crate::registry::TypeRegistry;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file_storage;

pub use file_storage::{FileStorage, DEFAULT_STORAGE_FILE};

pub type StorageResult<T> = Result<T, StorageError>;

/// Fatal storage failures.
#[derive(Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The backing file is not a valid JSON container.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A live record has a value with no JSON form.
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// One container entry is structurally invalid.
    CorruptEntry { key: String, reason: String },
    /// A container entry names a kind the registry does not know.
    UnknownKind { key: String, kind: String },
    /// A container entry failed record reconstruction.
    Record { key: String, source: RecordError },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "storage file `{}`: {source}", path.display()),
            Self::Parse { path, source } => write!(
                f,
                "storage file `{}` is not a valid record container: {source}",
                path.display()
            ),
            Self::Encode { key, source } => write!(f, "cannot encode `{key}`: {source}"),
            Self::CorruptEntry { key, reason } => write!(f, "corrupt entry `{key}`: {reason}"),
            Self::UnknownKind { key, kind } => {
                write!(f, "entry `{key}` has unknown kind `{kind}`")
            }
            Self::Record { key, source } => write!(f, "entry `{key}` is invalid: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            Self::Record { source, .. } => Some(source),
            Self::CorruptEntry { .. } | Self::UnknownKind { .. } => None,
        }
    }
}

/// Live registry plus whole-file persistence.
pub trait RecordStorage {
    /// Registry used to decode entries on reload.
    fn registry(&self) -> &TypeRegistry;

    /// Every registered record by composite key, sorted by key.
    fn all(&self) -> &BTreeMap<String, Record>;

    fn get(&self, key: &str) -> Option<&Record>;

    fn get_mut(&mut self, key: &str) -> Option<&mut Record>;

    /// Constructs a fresh record and registers it. Does not persist.
    fn create(&mut self, kind: RecordKind) -> &Record;

    /// Upserts under the record's composite key; the latest write wins.
    fn register(&mut self, record: Record);

    /// Removes one entry. Absent keys are a no-op returning `None`.
    fn delete(&mut self, key: &str) -> Option<Record>;

    /// Writes the whole registry to the backing file.
    fn persist(&self) -> StorageResult<()>;

    /// Loads the backing file into the registry. Returns the entry count.
    fn reload(&mut self) -> StorageResult<usize>;

    /// Stamps `updated_at` on one record and persists the registry.
    ///
    /// Returns `Ok(false)` without persisting when `key` is absent.
    fn commit(&mut self, key: &str) -> StorageResult<bool> {
        match self.get_mut(key) {
            Some(record) => record.touch(),
            None => return Ok(false),
        }
        self.persist()?;
        Ok(true)
    }

    /// Records of one kind, sorted by key.
    fn all_of_kind(&self, kind: RecordKind) -> Vec<&Record> {
        self.all()
            .values()
            .filter(|record| record.kind() == kind)
            .collect()
    }

    fn count(&self, kind: RecordKind) -> usize {
        self.all()
            .values()
            .filter(|record| record.kind() == kind)
            .count()
    }
}
