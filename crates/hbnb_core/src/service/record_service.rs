//! Record use-case service.
//!
//! # Responsibility
//! - Provide the create/show/destroy/all/update/count entry points the
//!   console drives.
//! - Validate kind names against the type registry before touching storage.
//!
//! # Invariants
//! - Every mutation is followed by a full persist.
//! - Ids are looked up by composite key before any mutation.
//! - Unknown kinds and absent records surface as `ServiceError`, never as
//!   storage errors.

use crate::model::kind::RecordKind;
use crate::model::record::{composite_key, EncodedRecord, RecordError};
use crate::model::value::FieldValue;
use crate::storage::{RecordStorage, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Kind name is not in the type registry.
    UnknownKind(String),
    /// No record lives under the composite key.
    NotFound(String),
    /// Caller supplied a value the record rejects.
    InvalidArgument(RecordError),
    /// Persisting failed.
    Storage(StorageError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(name) => write!(f, "unknown kind: {name}"),
            Self::NotFound(key) => write!(f, "record not found: {key}"),
            Self::InvalidArgument(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::UnknownKind(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<RecordError> for ServiceError {
    fn from(value: RecordError) -> Self {
        Self::InvalidArgument(value)
    }
}

/// Raw attribute value as typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInput {
    pub raw: String,
    /// Whether the value arrived inside double quotes.
    pub quoted: bool,
}

impl AttributeInput {
    pub fn new(raw: impl Into<String>, quoted: bool) -> Self {
        Self {
            raw: raw.into(),
            quoted,
        }
    }
}

/// Use-case facade over one storage implementation.
pub struct RecordService<S: RecordStorage> {
    storage: S,
}

impl<S: RecordStorage> RecordService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Resolves a kind name against the storage's type registry.
    pub fn resolve_kind(&self, name: &str) -> ServiceResult<RecordKind> {
        self.storage
            .registry()
            .resolve(name)
            .ok_or_else(|| ServiceError::UnknownKind(name.to_string()))
    }

    /// Creates and persists one record, returning its id.
    pub fn create(&mut self, kind_name: &str) -> ServiceResult<String> {
        let kind = self.resolve_kind(kind_name)?;
        let id = self.storage.create(kind).id().to_string();
        self.storage.persist()?;
        info!("event=record_created module=service status=ok kind={kind} id={id}");
        Ok(id)
    }

    /// Renders one record.
    pub fn show(&self, kind_name: &str, id: &str) -> ServiceResult<String> {
        let key = self.find_key(kind_name, id)?;
        self.storage
            .get(&key)
            .map(|record| record.render())
            .ok_or(ServiceError::NotFound(key))
    }

    /// Deletes one record and persists.
    pub fn destroy(&mut self, kind_name: &str, id: &str) -> ServiceResult<()> {
        let key = self.find_key(kind_name, id)?;
        self.storage.delete(&key);
        self.storage.persist()?;
        info!("event=record_destroyed module=service status=ok key={key}");
        Ok(())
    }

    /// Renders every record, or every record of one kind, sorted by key.
    pub fn all(&self, kind_name: Option<&str>) -> ServiceResult<Vec<String>> {
        let rendered = match kind_name {
            Some(name) => {
                let kind = self.resolve_kind(name)?;
                self.storage
                    .all_of_kind(kind)
                    .into_iter()
                    .map(|record| record.render())
                    .collect()
            }
            None => self
                .storage
                .all()
                .values()
                .map(|record| record.render())
                .collect(),
        };
        Ok(rendered)
    }

    /// Assigns one attribute and commits.
    ///
    /// The raw value is coerced to the attribute's declared type; undeclared
    /// attributes infer integer, float or string from unquoted input.
    pub fn update(
        &mut self,
        kind_name: &str,
        id: &str,
        attribute: &str,
        value: &AttributeInput,
    ) -> ServiceResult<()> {
        let key = self.find_key(kind_name, id)?;
        let record = self
            .storage
            .get_mut(&key)
            .ok_or_else(|| ServiceError::NotFound(key.clone()))?;
        let declared = record.declared_type(attribute);
        let parsed = FieldValue::parse_input(&value.raw, value.quoted, declared).ok_or_else(
            || RecordError::InvalidField {
                field: attribute.to_string(),
                expected: declared.map_or("value", |declared| declared.as_str()),
            },
        )?;
        record.set(attribute, parsed)?;
        self.commit(&key)
    }

    /// Assigns several attributes from a JSON object and commits once.
    ///
    /// `id` entries are skipped. Nothing is assigned unless every value is
    /// accepted.
    pub fn update_fields(
        &mut self,
        kind_name: &str,
        id: &str,
        fields: &EncodedRecord,
    ) -> ServiceResult<()> {
        let key = self.find_key(kind_name, id)?;
        let record = self
            .storage
            .get_mut(&key)
            .ok_or_else(|| ServiceError::NotFound(key.clone()))?;

        let mut staged = record.clone();
        for (name, raw) in fields {
            if name == "id" {
                continue;
            }
            let value = FieldValue::from_json(raw).ok_or_else(|| RecordError::InvalidField {
                field: name.clone(),
                expected: "string, integer, float or list of strings",
            })?;
            staged.set(name, value)?;
        }
        *record = staged;
        self.commit(&key)
    }

    /// Counts records of one kind.
    pub fn count(&self, kind_name: &str) -> ServiceResult<usize> {
        let kind = self.resolve_kind(kind_name)?;
        Ok(self.storage.count(kind))
    }

    /// Composite key of an existing record, or the lookup miss.
    pub fn find_key(&self, kind_name: &str, id: &str) -> ServiceResult<String> {
        let kind = self.resolve_kind(kind_name)?;
        let key = composite_key(kind.as_str(), id);
        if self.storage.get(&key).is_none() {
            return Err(ServiceError::NotFound(key));
        }
        Ok(key)
    }

    fn commit(&mut self, key: &str) -> ServiceResult<()> {
        if !self.storage.commit(key)? {
            return Err(ServiceError::NotFound(key.to_string()));
        }
        info!("event=record_updated module=service status=ok key={key}");
        Ok(())
    }
}
