//! Record domain model.
//!
//! # Responsibility
//! - Define the identity and timestamp lifecycle shared by every kind.
//! - Encode records to their flat wire mapping and reconstruct them from it.
//! - Render the human-readable display form.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `updated_at >= created_at` at every observable point.
//! - Identity fields are never stored in the open field map.

use crate::model::kind::RecordKind;
use crate::model::timestamp::{self, Timestamp};
use crate::model::value::{FieldType, FieldValue};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Wire entry naming the record kind.
pub const KIND_FIELD: &str = "__class__";
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

const IDENTITY_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Flat wire mapping produced by [`Record::encode`].
pub type EncodedRecord = serde_json::Map<String, serde_json::Value>;

/// Builds the composite registry key `"<kind>.<id>"`.
pub fn composite_key(kind: &str, id: &str) -> String {
    format!("{kind}.{id}")
}

/// Splits a composite key at its first dot into `(kind, id)`.
pub fn split_composite_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
        .filter(|(kind, id)| !kind.is_empty() && !id.is_empty())
}

/// Contract violations while building or mutating a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// An identity field was supplied as `null`.
    NullIdentityField(&'static str),
    /// Only some of `id`/`created_at`/`updated_at` were supplied.
    IncompleteIdentity { missing: Vec<&'static str> },
    /// A field holds a value of the wrong shape.
    InvalidField {
        field: String,
        expected: &'static str,
    },
    /// A timestamp string did not match the wire format.
    InvalidTimestamp { field: &'static str, value: String },
    /// The wire kind entry disagrees with the kind being decoded.
    KindMismatch {
        expected: RecordKind,
        found: String,
    },
    /// Identity fields and the kind entry cannot be assigned.
    ReadOnlyField(String),
    /// Field names must be non-empty.
    EmptyFieldName,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullIdentityField(field) => write!(f, "`{field}` must not be null"),
            Self::IncompleteIdentity { missing } => write!(
                f,
                "reconstruction requires id, created_at and updated_at together; missing {}",
                missing.join(", ")
            ),
            Self::InvalidField { field, expected } => {
                write!(f, "field `{field}` must be a {expected}")
            }
            Self::InvalidTimestamp { field, value } => {
                write!(f, "field `{field}` has invalid timestamp `{value}`")
            }
            Self::KindMismatch { expected, found } => {
                write!(f, "kind entry `{found}` does not match `{expected}`")
            }
            Self::ReadOnlyField(field) => write!(f, "field `{field}` is read-only"),
            Self::EmptyFieldName => write!(f, "field name must not be empty"),
        }
    }
}

impl Error for RecordError {}

/// One persisted domain entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    id: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a fresh record with a new unique id and declared defaults.
    ///
    /// The record is not registered anywhere; `RecordStorage::create` is the
    /// registering path.
    pub fn new(kind: RecordKind) -> Self {
        let now = timestamp::now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            fields: declared_defaults(kind),
        }
    }

    /// Builds a record from its wire mapping.
    ///
    /// An empty mapping yields a fresh record. A mapping carrying all of
    /// `id`/`created_at`/`updated_at` reconstructs that identity verbatim; a
    /// mapping carrying none of them gets a fresh identity with the remaining
    /// fields applied.
    ///
    /// # Errors
    /// - `NullIdentityField` when an identity field is explicitly `null`.
    /// - `IncompleteIdentity` when only some identity fields are present.
    /// - `InvalidTimestamp`/`InvalidField` for malformed values.
    /// - `KindMismatch` when the kind entry names another kind.
    pub fn from_fields(kind: RecordKind, fields: &EncodedRecord) -> Result<Self, RecordError> {
        if let Some(found) = fields.get(KIND_FIELD) {
            if found.as_str() != Some(kind.as_str()) {
                return Err(RecordError::KindMismatch {
                    expected: kind,
                    found: found
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| found.to_string()),
                });
            }
        }

        for name in IDENTITY_FIELDS {
            if matches!(fields.get(name), Some(serde_json::Value::Null)) {
                return Err(RecordError::NullIdentityField(name));
            }
        }

        let missing: Vec<&'static str> = IDENTITY_FIELDS
            .into_iter()
            .filter(|name| !fields.contains_key(*name))
            .collect();

        let mut record = match missing.len() {
            0 => {
                let id = fields
                    .get(ID_FIELD)
                    .and_then(|value| value.as_str())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| RecordError::InvalidField {
                        field: ID_FIELD.to_string(),
                        expected: "non-empty string",
                    })?;
                let created_at = parse_timestamp_field(fields, CREATED_AT_FIELD)?;
                let updated_at = parse_timestamp_field(fields, UPDATED_AT_FIELD)?.max(created_at);
                Self {
                    kind,
                    id: id.to_string(),
                    created_at,
                    updated_at,
                    fields: declared_defaults(kind),
                }
            }
            3 => Self::new(kind),
            _ => return Err(RecordError::IncompleteIdentity { missing }),
        };

        for (name, raw) in fields {
            if name == KIND_FIELD || IDENTITY_FIELDS.contains(&name.as_str()) {
                continue;
            }
            let value = decode_field(kind, name, raw)?;
            record.fields.insert(name.clone(), value);
        }

        Ok(record)
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Composite registry key `"<kind>.<id>"`.
    pub fn key(&self) -> String {
        composite_key(self.kind.as_str(), &self.id)
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns one non-identity field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns all non-identity fields, sorted by name.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Declared type of `name` for this record's kind, if any.
    pub fn declared_type(&self, name: &str) -> Option<FieldType> {
        self.kind.declared_type(name)
    }

    /// Assigns one field without committing.
    ///
    /// Declared fields are coerced to their declared type; undeclared fields
    /// are stored as given.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), RecordError> {
        if name.is_empty() {
            return Err(RecordError::EmptyFieldName);
        }
        if name == KIND_FIELD || IDENTITY_FIELDS.contains(&name) {
            return Err(RecordError::ReadOnlyField(name.to_string()));
        }
        if !value.is_finite() {
            return Err(RecordError::InvalidField {
                field: name.to_string(),
                expected: "finite float",
            });
        }
        let value = match self.declared_type(name) {
            Some(expected) => {
                value
                    .coerce_to(expected)
                    .ok_or_else(|| RecordError::InvalidField {
                        field: name.to_string(),
                        expected: expected.as_str(),
                    })?
            }
            None => value,
        };
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Stamps `updated_at` with the current instant.
    ///
    /// Persisting is the storage's half of a commit.
    pub fn touch(&mut self) {
        self.updated_at = timestamp::now().max(self.created_at);
    }

    /// Produces the flat wire mapping.
    ///
    /// # Errors
    /// - Fails when a field value has no JSON form.
    pub fn encode(&self) -> Result<EncodedRecord, serde_json::Error> {
        let mut encoded = EncodedRecord::new();
        for (name, value) in &self.fields {
            encoded.insert(name.clone(), value.to_json()?);
        }
        encoded.insert(ID_FIELD.to_string(), self.id.clone().into());
        encoded.insert(
            CREATED_AT_FIELD.to_string(),
            timestamp::format(&self.created_at).into(),
        );
        encoded.insert(
            UPDATED_AT_FIELD.to_string(),
            timestamp::format(&self.updated_at).into(),
        );
        encoded.insert(KIND_FIELD.to_string(), self.kind.as_str().into());
        Ok(encoded)
    }

    /// Human-readable form `[<kind>] (<id>) {<attributes>}`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'{}': '{}', '{}': {}, '{}': {}",
            self.kind,
            self.id,
            ID_FIELD,
            self.id,
            CREATED_AT_FIELD,
            self.created_at,
            UPDATED_AT_FIELD,
            self.updated_at
        )?;
        for (name, value) in &self.fields {
            write!(f, ", '{name}': {value}")?;
        }
        write!(f, "}}")
    }
}

fn declared_defaults(kind: RecordKind) -> BTreeMap<String, FieldValue> {
    kind.fields()
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default.to_value()))
        .collect()
}

fn parse_timestamp_field(
    fields: &EncodedRecord,
    name: &'static str,
) -> Result<Timestamp, RecordError> {
    let raw = fields.get(name).and_then(|value| value.as_str());
    match raw {
        Some(text) => timestamp::parse(text).ok_or_else(|| RecordError::InvalidTimestamp {
            field: name,
            value: text.to_string(),
        }),
        None => Err(RecordError::InvalidField {
            field: name.to_string(),
            expected: "timestamp string",
        }),
    }
}

fn decode_field(
    kind: RecordKind,
    name: &str,
    raw: &serde_json::Value,
) -> Result<FieldValue, RecordError> {
    let value = FieldValue::from_json(raw).ok_or_else(|| RecordError::InvalidField {
        field: name.to_string(),
        expected: "string, integer, float or list of strings",
    })?;
    let Some(expected) = kind.declared_type(name) else {
        return Ok(value);
    };
    // Older files may hold declared numbers as strings.
    let coerced = match value {
        FieldValue::Str(text) if expected != FieldType::Str => {
            FieldValue::parse_input(&text, false, Some(expected))
        }
        other => other.coerce_to(expected),
    };
    coerced.ok_or_else(|| RecordError::InvalidField {
        field: name.to_string(),
        expected: expected.as_str(),
    })
}
