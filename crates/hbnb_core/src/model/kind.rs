//! Record kinds and their declared fields.

use crate::model::value::{FieldType, FieldValue};

/// Concrete record kind. The name doubles as the wire discriminant and the
/// composite-key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

/// One declared field with its default value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: FieldDefault,
}

/// Compile-time default for a declared field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Str(&'static str),
    Int(i64),
    Float(f64),
    EmptyList,
}

impl FieldDefault {
    pub fn field_type(self) -> FieldType {
        match self {
            Self::Str(_) => FieldType::Str,
            Self::Int(_) => FieldType::Int,
            Self::Float(_) => FieldType::Float,
            Self::EmptyList => FieldType::List,
        }
    }

    pub fn to_value(self) -> FieldValue {
        match self {
            Self::Str(value) => FieldValue::Str(value.to_string()),
            Self::Int(value) => FieldValue::Int(value),
            Self::Float(value) => FieldValue::Float(value),
            Self::EmptyList => FieldValue::List(Vec::new()),
        }
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        default: FieldDefault::Str(""),
    }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        default: FieldDefault::Int(0),
    }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        default: FieldDefault::Float(0.0),
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    text("email"),
    text("password"),
    text("first_name"),
    text("last_name"),
];
const STATE_FIELDS: &[FieldSpec] = &[text("name")];
const CITY_FIELDS: &[FieldSpec] = &[text("state_id"), text("name")];
const AMENITY_FIELDS: &[FieldSpec] = &[text("name")];
const PLACE_FIELDS: &[FieldSpec] = &[
    text("city_id"),
    text("user_id"),
    text("name"),
    text("description"),
    int("number_rooms"),
    int("number_bathrooms"),
    int("max_guest"),
    int("price_by_night"),
    float("latitude"),
    float("longitude"),
    FieldSpec {
        name: "amenity_ids",
        default: FieldDefault::EmptyList,
    },
];
const REVIEW_FIELDS: &[FieldSpec] = &[text("place_id"), text("user_id"), text("text")];

/// Every kind in declaration order.
pub const ALL_KINDS: &[RecordKind] = &[
    RecordKind::BaseModel,
    RecordKind::User,
    RecordKind::State,
    RecordKind::City,
    RecordKind::Amenity,
    RecordKind::Place,
    RecordKind::Review,
];

impl RecordKind {
    /// Stable name used on the wire and in composite keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    /// Declared fields seeded on every new record of this kind.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::BaseModel => &[],
            Self::User => USER_FIELDS,
            Self::State => STATE_FIELDS,
            Self::City => CITY_FIELDS,
            Self::Amenity => AMENITY_FIELDS,
            Self::Place => PLACE_FIELDS,
            Self::Review => REVIEW_FIELDS,
        }
    }

    /// Declared type of `name`, if the kind declares it.
    pub fn declared_type(self, name: &str) -> Option<FieldType> {
        self.fields()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.default.field_type())
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
