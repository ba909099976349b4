//! JSON file-backed record storage.
//!
//! # Responsibility
//! - Hold the live registry for one process.
//! - Serialize the registry into one JSON object keyed by composite key.
//! - Rebuild records from that object through the type registry.
//!
//! # Invariants
//! - Writes go to a sibling temp file first and are renamed into place.
//! - Every record is encoded before the temp file is touched.
//! - Container keys are written sorted, so unchanged registries persist to
//!   byte-identical files.
//! - Reload is all-or-nothing: any bad entry aborts before registration.
//!
//! # See also
//! - DESIGN.md (unknown kinds abort reload)

use super::{RecordStorage, StorageError, StorageResult};
use crate::model::kind::RecordKind;
use crate::model::record::{split_composite_key, Record};
use crate::registry::TypeRegistry;
use log::{debug, error, info};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Backing file used when no path is configured.
pub const DEFAULT_STORAGE_FILE: &str = "file.json";

/// Storage over a single JSON backing file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    registry: TypeRegistry,
    objects: BTreeMap<String, Record>,
}

impl FileStorage {
    /// Creates an empty storage bound to `path` with the built-in kinds.
    ///
    /// Nothing is read until [`RecordStorage::reload`] is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_registry(path, TypeRegistry::builtin())
    }

    pub fn with_registry(path: impl AsRef<Path>, registry: TypeRegistry) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            registry,
            objects: BTreeMap::new(),
        }
    }

    /// Creates the storage and reloads the backing file into it.
    ///
    /// # Errors
    /// - Propagates every reload error; a missing file is not an error.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let mut storage = Self::new(path);
        storage.reload()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_container(&self, payload: &str) -> StorageResult<()> {
        let temp_path = self.temp_path();
        if let Err(err) = fs::write(&temp_path, payload) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(err));
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(err));
        }
        Ok(())
    }

    fn encode_container(&self) -> StorageResult<String> {
        let mut container = serde_json::Map::new();
        for (key, record) in &self.objects {
            let encoded = record.encode().map_err(|source| StorageError::Encode {
                key: key.clone(),
                source,
            })?;
            container.insert(key.clone(), serde_json::Value::Object(encoded));
        }
        Ok(serde_json::Value::Object(container).to_string())
    }

    fn decode_container(&self, raw: &str) -> StorageResult<Vec<Record>> {
        let container: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut decoded = Vec::with_capacity(container.len());
        for (key, value) in container {
            decoded.push(self.decode_entry(key, value)?);
        }
        Ok(decoded)
    }

    fn decode_entry(&self, key: String, value: serde_json::Value) -> StorageResult<Record> {
        let (kind_name, id) = match split_composite_key(&key) {
            Some((kind_name, id)) => (kind_name.to_string(), id.to_string()),
            None => {
                return Err(StorageError::CorruptEntry {
                    key,
                    reason: "key is not `<kind>.<id>`".to_string(),
                })
            }
        };
        let serde_json::Value::Object(fields) = value else {
            return Err(StorageError::CorruptEntry {
                key,
                reason: "entry is not an object".to_string(),
            });
        };

        let record = match self.registry.decode(&kind_name, &fields) {
            Some(Ok(record)) => record,
            Some(Err(source)) => return Err(StorageError::Record { key, source }),
            None => {
                return Err(StorageError::UnknownKind {
                    key,
                    kind: kind_name,
                })
            }
        };
        if record.id() != id {
            return Err(StorageError::CorruptEntry {
                reason: format!("entry id `{}` does not match key", record.id()),
                key,
            });
        }
        Ok(record)
    }
}

impl RecordStorage for FileStorage {
    fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn all(&self) -> &BTreeMap<String, Record> {
        &self.objects
    }

    fn get(&self, key: &str) -> Option<&Record> {
        self.objects.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.objects.get_mut(key)
    }

    fn create(&mut self, kind: RecordKind) -> &Record {
        let record = Record::new(kind);
        debug!(
            "event=record_create module=storage status=ok kind={} id={}",
            kind,
            record.id()
        );
        match self.objects.entry(record.key()) {
            Entry::Occupied(mut entry) => {
                entry.insert(record);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(record),
        }
    }

    fn register(&mut self, record: Record) {
        let key = record.key();
        let replaced = self.objects.insert(key.clone(), record).is_some();
        debug!("event=record_register module=storage status=ok key={key} replaced={replaced}");
    }

    fn delete(&mut self, key: &str) -> Option<Record> {
        let removed = self.objects.remove(key);
        debug!(
            "event=record_delete module=storage status=ok key={key} found={}",
            removed.is_some()
        );
        removed
    }

    fn persist(&self) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = self
            .encode_container()
            .and_then(|payload| self.write_container(&payload).map(|()| payload.len()));

        match result {
            Ok(bytes) => {
                info!(
                    "event=storage_persist module=storage status=ok records={} bytes={} duration_ms={}",
                    self.objects.len(),
                    bytes,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_persist module=storage status=error path={} duration_ms={} error={}",
                    self.path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn reload(&mut self) -> StorageResult<usize> {
        let started_at = Instant::now();
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=storage_reload module=storage status=ok records=0 reason=file_absent path={}",
                    self.path.display()
                );
                return Ok(0);
            }
            Err(err) => {
                let err = self.io_error(err);
                error!("event=storage_reload module=storage status=error error={err}");
                return Err(err);
            }
        };

        let decoded = match self.decode_container(&raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(
                    "event=storage_reload module=storage status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(err);
            }
        };

        let count = decoded.len();
        for record in decoded {
            self.objects.insert(record.key(), record);
        }
        info!(
            "event=storage_reload module=storage status=ok records={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }
}
