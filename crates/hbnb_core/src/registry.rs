//! Kind-name registry used to resolve and decode records.
//!
//! # Responsibility
//! - Map kind names to their `RecordKind` and wire decoder.
//! - Serve both console kind validation and storage reload.
//!
//! # Invariants
//! - Kind names are unique within one registry.
//! - Lookup misses are reported as `None`; callers decide how to surface them.

use crate::model::kind::{RecordKind, ALL_KINDS};
use crate::model::record::{EncodedRecord, Record, RecordError};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decoder from a wire mapping to a concrete record.
pub type DecodeFn = fn(&EncodedRecord) -> Result<Record, RecordError>;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRegistryError {
    DuplicateKind(String),
}

impl Display for TypeRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKind(name) => write!(f, "kind already registered: {name}"),
        }
    }
}

impl Error for TypeRegistryError {}

/// One registered kind.
#[derive(Clone, Copy)]
pub struct KindEntry {
    pub kind: RecordKind,
    pub decode: DecodeFn,
}

/// Fixed mapping from kind name to decoder.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<&'static str, KindEntry>,
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("kinds", &self.kind_names())
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in ALL_KINDS {
            // ALL_KINDS names are unique.
            let _ = registry.register(*kind, decoder_for(*kind));
        }
        registry
    }

    /// Registers one kind under its wire name.
    pub fn register(
        &mut self,
        kind: RecordKind,
        decode: DecodeFn,
    ) -> Result<(), TypeRegistryError> {
        let name = kind.as_str();
        if self.entries.contains_key(name) {
            return Err(TypeRegistryError::DuplicateKind(name.to_string()));
        }
        self.entries.insert(name, KindEntry { kind, decode });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns sorted kind names.
    pub fn kind_names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, name: &str) -> Option<&KindEntry> {
        self.entries.get(name)
    }

    /// Resolves a kind name. Matching is exact and case-sensitive.
    pub fn resolve(&self, name: &str) -> Option<RecordKind> {
        self.get(name).map(|entry| entry.kind)
    }

    /// Decodes one wire mapping as `name`.
    ///
    /// Returns `None` when the kind is not registered.
    pub fn decode(
        &self,
        name: &str,
        fields: &EncodedRecord,
    ) -> Option<Result<Record, RecordError>> {
        self.get(name).map(|entry| (entry.decode)(fields))
    }
}

fn decoder_for(kind: RecordKind) -> DecodeFn {
    match kind {
        RecordKind::BaseModel => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::BaseModel, fields)
        }
        RecordKind::User => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::User, fields)
        }
        RecordKind::State => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::State, fields)
        }
        RecordKind::City => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::City, fields)
        }
        RecordKind::Amenity => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::Amenity, fields)
        }
        RecordKind::Place => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::Place, fields)
        }
        RecordKind::Review => {
            |fields: &EncodedRecord| Record::from_fields(RecordKind::Review, fields)
        }
    }
}
