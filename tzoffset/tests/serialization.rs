use std::sync::Arc;

use serde_json::{Value, json};
use tzoffset::{Document, OffsetOptions, Schema, SerializationConfig, SerializeOptions, install};

fn schema() -> Arc<Schema> {
    let mut schema = Schema::from_definition(&json!({
        "string": "string",
        "when": {"created": "date"}
    }))
    .unwrap();
    install(&mut schema, &OffsetOptions::default()).unwrap();
    Arc::new(schema)
}

fn sample() -> Document {
    Document::from_value(
        schema(),
        json!({"string": "s", "when": {"created": "2018-04-20T13:30:00.716+02:00"}}),
    )
    .unwrap()
}

#[test]
fn object_form_includes_computed_field() {
    let object = sample().to_object().unwrap();
    assert_eq!(object["when"]["created"], json!("2018-04-20T13:30:00.716+02:00"));
    assert_eq!(object["when"]["created_utc"], json!("2018-04-20T11:30:00.716Z"));
    assert_eq!(object["when"]["created_offset"], json!(2));
    assert_eq!(object["string"], json!("s"));
}

#[test]
fn json_form_includes_computed_field() {
    let text = sample().to_json().unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["when"]["created"], json!("2018-04-20T13:30:00.716+02:00"));

    let via_serde = serde_json::to_string(&sample()).unwrap();
    assert_eq!(via_serde, text);
}

#[test]
fn lean_read_has_only_stored_pair() {
    let doc = sample();
    let lean = doc.lean();
    assert!(lean["when"].get("created").is_none());
    assert_eq!(lean["when"]["created_utc"], json!("2018-04-20T11:30:00.716Z"));
    assert_eq!(lean["when"]["created_offset"], json!(2));

    assert_eq!(&doc.to_object_with(SerializeOptions::LEAN).unwrap(), lean);
}

#[test]
fn consumers_can_ask_for_computed_value_only() {
    let object = sample()
        .to_object_with(SerializeOptions::with_virtuals().hiding_stored_parts())
        .unwrap();
    assert_eq!(
        object,
        json!({"string": "s", "when": {"created": "2018-04-20T13:30:00.716+02:00"}})
    );
}

#[test]
fn unset_computed_field_is_omitted() {
    let doc = Document::from_value(schema(), json!({"string": "only"})).unwrap();
    assert_eq!(doc.to_object().unwrap(), json!({"string": "only"}));
}

#[test]
fn schema_without_plugin_renders_stored_data() {
    let mut plain = Schema::from_definition(&json!({"when": {"created": "date"}})).unwrap();
    plain.set_serialization(SerializationConfig::default());
    let doc = Document::from_value(Arc::new(plain), json!({"when": {"created": "2020-01-01T00:00:00Z"}})).unwrap();
    assert_eq!(doc.to_object().unwrap(), json!({"when": {"created": "2020-01-01T00:00:00Z"}}));
}

#[test]
fn reading_back_from_storage_text_keeps_offset() {
    let stored = serde_json::to_string(sample().lean()).unwrap();
    let reloaded = Document::from_stored(schema(), serde_json::from_str(&stored).unwrap()).unwrap();
    assert_eq!(
        reloaded.get("when.created").unwrap(),
        json!("2018-04-20T13:30:00.716+02:00")
    );
}
