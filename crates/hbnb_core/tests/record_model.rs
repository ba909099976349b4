use hbnb_core::{
    EncodedRecord, FieldValue, Record, RecordError, RecordKind, ALL_KINDS, KIND_FIELD,
};
use serde_json::json;
use std::collections::HashSet;

fn encoded(value: serde_json::Value) -> EncodedRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn new_records_get_unique_ids() {
    let ids: HashSet<String> = (0..500)
        .map(|_| Record::new(RecordKind::BaseModel).id().to_string())
        .collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn later_records_have_later_creation_times() {
    let first = Record::new(RecordKind::User);
    let second = Record::new(RecordKind::User);
    assert!(second.created_at() > first.created_at());
    assert_eq!(first.created_at(), first.updated_at());
}

#[test]
fn touch_moves_updated_at_forward_only() {
    let mut record = Record::new(RecordKind::City);
    let created_at = record.created_at();
    let before = record.updated_at();

    record.touch();
    assert!(record.updated_at() > before);
    assert_eq!(record.created_at(), created_at);
}

#[test]
fn new_records_carry_declared_defaults() {
    let place = Record::new(RecordKind::Place);
    assert_eq!(place.get("name"), Some(&FieldValue::Str(String::new())));
    assert_eq!(place.get("max_guest"), Some(&FieldValue::Int(0)));
    assert_eq!(place.get("latitude"), Some(&FieldValue::Float(0.0)));
    assert_eq!(place.get("amenity_ids"), Some(&FieldValue::List(Vec::new())));

    let base = Record::new(RecordKind::BaseModel);
    assert!(base.fields().is_empty());
}

#[test]
fn encode_then_decode_preserves_identity_and_dynamic_fields() {
    let mut record = Record::new(RecordKind::Place);
    record.set("name", "Loft".into()).unwrap();
    record.set("max_guest", FieldValue::Int(4)).unwrap();
    record.set("nickname", "the loft".into()).unwrap();
    record.set("my_number", FieldValue::Int(62)).unwrap();
    record.set("ratio", FieldValue::Float(3.0)).unwrap();
    record.set("score", FieldValue::Float(-2.5)).unwrap();
    record.touch();

    let wire = record.encode().unwrap();
    assert_eq!(wire[KIND_FIELD], "Place");
    assert_eq!(wire["id"], record.id());
    assert_eq!(wire["nickname"], "the loft");
    assert_eq!(wire["my_number"].as_i64(), Some(62));
    assert!(wire["ratio"].is_f64());
    assert_eq!(wire["score"].as_f64(), Some(-2.5));

    let decoded = Record::from_fields(RecordKind::Place, &wire).unwrap();
    assert_eq!(decoded.get("my_number"), Some(&FieldValue::Int(62)));
    assert_eq!(decoded.get("ratio"), Some(&FieldValue::Float(3.0)));
    assert_eq!(decoded, record);
    assert_eq!(decoded.encode().unwrap(), wire);
}

#[test]
fn set_rejects_non_finite_floats() {
    let mut place = Record::new(RecordKind::Place);
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = place.set("latitude", FieldValue::Float(value)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "latitude"));
        let err = place.set("drift", FieldValue::Float(value)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "drift"));
    }
    assert_eq!(place.get("latitude"), Some(&FieldValue::Float(0.0)));
    assert_eq!(place.get("drift"), None);
    assert!(place.encode().is_ok());
}

#[test]
fn wire_timestamps_use_six_fraction_digits() {
    let wire = Record::new(RecordKind::State).encode().unwrap();
    let created_at = wire["created_at"].as_str().unwrap();
    let (_, fraction) = created_at.split_once('.').expect("fractional seconds");
    assert_eq!(fraction.len(), 6);
    assert!(created_at.contains('T'));
}

#[test]
fn empty_mapping_builds_a_fresh_record() {
    let record = Record::from_fields(RecordKind::Amenity, &EncodedRecord::new()).unwrap();
    assert_eq!(record.kind(), RecordKind::Amenity);
    assert!(!record.id().is_empty());
}

#[test]
fn mapping_without_identity_keeps_other_fields() {
    let record =
        Record::from_fields(RecordKind::State, &encoded(json!({ "name": "Lagos" }))).unwrap();
    assert_eq!(record.get("name"), Some(&FieldValue::from("Lagos")));
}

#[test]
fn null_identity_field_is_rejected() {
    let err = Record::from_fields(
        RecordKind::User,
        &encoded(json!({
            "id": null,
            "created_at": "2024-01-01T00:00:00.000000",
            "updated_at": "2024-01-01T00:00:00.000000",
        })),
    )
    .unwrap_err();
    assert_eq!(err, RecordError::NullIdentityField("id"));
}

#[test]
fn partial_identity_is_rejected() {
    let err = Record::from_fields(
        RecordKind::User,
        &encoded(json!({ "id": "abc", "created_at": "2024-01-01T00:00:00.000000" })),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RecordError::IncompleteIdentity {
            missing: vec!["updated_at"]
        }
    );
}

#[test]
fn malformed_timestamp_is_rejected() {
    let err = Record::from_fields(
        RecordKind::City,
        &encoded(json!({
            "id": "abc",
            "created_at": "yesterday",
            "updated_at": "2024-01-01T00:00:00.000000",
        })),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RecordError::InvalidTimestamp {
            field: "created_at",
            ..
        }
    ));
}

#[test]
fn mismatched_kind_entry_is_rejected() {
    let wire = Record::new(RecordKind::User).encode().unwrap();
    let err = Record::from_fields(RecordKind::City, &wire).unwrap_err();
    assert!(matches!(err, RecordError::KindMismatch { .. }));
}

#[test]
fn reconstruction_clamps_updated_at_to_created_at() {
    let record = Record::from_fields(
        RecordKind::Review,
        &encoded(json!({
            "id": "r-1",
            "created_at": "2024-05-02T10:00:00.000000",
            "updated_at": "2024-05-01T10:00:00.000000",
        })),
    )
    .unwrap();
    assert_eq!(record.updated_at(), record.created_at());
}

#[test]
fn declared_numbers_stored_as_strings_are_parsed() {
    let record = Record::from_fields(
        RecordKind::Place,
        &encoded(json!({ "number_rooms": "3", "latitude": 6 })),
    )
    .unwrap();
    assert_eq!(record.get("number_rooms"), Some(&FieldValue::Int(3)));
    assert_eq!(record.get("latitude"), Some(&FieldValue::Float(6.0)));
}

#[test]
fn set_rejects_identity_and_kind_fields() {
    let mut record = Record::new(RecordKind::User);
    for field in ["id", "created_at", "updated_at", KIND_FIELD] {
        let err = record.set(field, "x".into()).unwrap_err();
        assert_eq!(err, RecordError::ReadOnlyField(field.to_string()));
    }
    assert_eq!(
        record.set("", "x".into()).unwrap_err(),
        RecordError::EmptyFieldName
    );
}

#[test]
fn set_coerces_declared_fields() {
    let mut place = Record::new(RecordKind::Place);
    place.set("longitude", FieldValue::Int(3)).unwrap();
    assert_eq!(place.get("longitude"), Some(&FieldValue::Float(3.0)));

    let err = place.set("max_guest", "many".into()).unwrap_err();
    assert!(matches!(err, RecordError::InvalidField { .. }));
    assert_eq!(place.get("max_guest"), Some(&FieldValue::Int(0)));
}

#[test]
fn render_lists_identity_then_sorted_fields() {
    let mut state = Record::new(RecordKind::State);
    state.set("name", "Lagos".into()).unwrap();
    state.set("code", FieldValue::Int(25)).unwrap();

    let rendered = state.render();
    let prefix = format!("[State] ({}) {{'id': '{}', 'created_at': ", state.id(), state.id());
    assert!(rendered.starts_with(&prefix), "{rendered}");
    assert!(rendered.ends_with(", 'code': 25, 'name': 'Lagos'}"), "{rendered}");
}

#[test]
fn every_kind_name_matches_its_key_prefix() {
    for kind in ALL_KINDS {
        let record = Record::new(*kind);
        assert_eq!(record.key(), format!("{}.{}", kind.as_str(), record.id()));
    }
}
