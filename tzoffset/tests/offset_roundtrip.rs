use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};
use serde_json::{Value, json};
use tzoffset::{Document, OffsetOptions, OffsetPolicy, Schema, install};

fn schema_with(policy: OffsetPolicy) -> Arc<Schema> {
    let mut schema = Schema::from_definition(&json!({
        "string": "string",
        "updated": "date",
        "when": {"created": "date"}
    }))
    .expect("valid definition");
    install(&mut schema, &OffsetOptions::default().with_policy(policy)).expect("plugin installs");
    Arc::new(schema)
}

fn schema() -> Arc<Schema> {
    schema_with(OffsetPolicy::Hours)
}

fn at(text: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(text).expect("valid rfc3339")
}

/// Simulates a save and reload: only the stored form survives.
fn reload(doc: &Document) -> Document {
    Document::from_stored(Arc::clone(doc.schema()), doc.lean().clone()).expect("stored data is an object")
}

#[test]
fn string_values_are_untouched() {
    let doc = Document::from_value(schema(), json!({"string": "str1"})).unwrap();
    assert_eq!(reload(&doc).get("string").unwrap(), json!("str1"));
}

#[test]
fn basic_datetime_round_trips() {
    let now = Utc::now();
    let mut doc = Document::new(schema());
    doc.set_timestamp("updated", now).unwrap();

    let saved = reload(&doc);
    let restored = saved.timestamp("updated").unwrap().expect("value present");
    assert_eq!(restored, now);
    assert_eq!(restored.offset().local_minus_utc(), 0);
}

#[test]
fn nested_datetime_round_trips() {
    let now = Utc::now();
    let mut doc = Document::new(schema());
    doc.set_timestamp("when.created", now).unwrap();

    let saved = reload(&doc);
    assert_eq!(saved.timestamp("when.created").unwrap(), Some(now.fixed_offset()));
    assert!(saved.lean()["when"]["created_utc"].is_string());
}

#[test]
fn offset_is_saved_alongside_the_instant() {
    let input = at("2018-03-20T13:30:00.716+01:00");
    let doc = Document::from_value(schema(), json!({"when": {"created": input.to_rfc3339()}})).unwrap();
    let saved = reload(&doc);

    let created = saved.timestamp("when.created").unwrap().unwrap();
    assert_eq!(created, input);
    let utc: DateTime<Utc> = saved.get("when.created_utc").unwrap().as_str().unwrap().parse().unwrap();
    assert_eq!(utc, input);
    assert_eq!(saved.get("when.created_offset").unwrap(), json!(1));
}

#[test]
fn summer_time_offset_is_saved() {
    // CET observes +02:00 in April.
    let input = at("2018-04-20T13:30:00.716+02:00");
    let mut doc = Document::new(schema());
    doc.set_timestamp("when.created", input).unwrap();

    let saved = reload(&doc);
    assert_eq!(saved.get("when.created_offset").unwrap(), json!(2));
    let created = saved.timestamp("when.created").unwrap().unwrap();
    assert_eq!(created, input);
    assert_eq!(
        (created.year(), created.month(), created.day(), created.hour(), created.minute()),
        (2018, 4, 20, 13, 30)
    );
}

#[test]
fn negative_half_hour_offset_is_fractional() {
    let mut doc = Document::new(schema());
    doc.set("updated", json!("2021-11-05T09:15:00-05:30")).unwrap();
    assert_eq!(doc.get("updated_offset").unwrap().as_f64(), Some(-5.5));
    let updated = doc.timestamp("updated").unwrap().unwrap();
    assert_eq!((updated.hour(), updated.minute()), (9, 15));
}

#[test]
fn west_coast_wall_clock_survives() {
    let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
    let local = pacific.with_ymd_and_hms(2019, 7, 4, 18, 45, 0).unwrap();
    let mut doc = Document::new(schema());
    doc.set_timestamp("when.created", local).unwrap();

    let saved = reload(&doc);
    assert_eq!(saved.get("when.created_offset").unwrap(), json!(-7));
    let created = saved.timestamp("when.created").unwrap().unwrap();
    assert_eq!(created.to_rfc3339(), "2019-07-04T18:45:00-07:00");
    let utc = saved.get("when.created_utc").unwrap();
    assert_eq!(utc, json!("2019-07-05T01:45:00Z"));
}

#[test]
fn null_write_keeps_existing_values() {
    let mut doc = Document::new(schema());
    doc.set("when.created", json!("2018-03-20T13:30:00+01:00")).unwrap();
    let before = doc.lean().clone();

    doc.set("when.created", Value::Null).unwrap();
    doc.set("when.created", json!("")).unwrap();
    assert_eq!(doc.lean(), &before);
}

#[test]
fn unset_field_reads_as_null() {
    let doc = Document::new(schema());
    assert_eq!(doc.timestamp("updated").unwrap(), None);
    assert_eq!(doc.get("when.created").unwrap(), Value::Null);
}

#[test]
fn reads_are_recomputed_from_stored_fields() {
    let mut doc = Document::new(schema());
    doc.set("updated", json!("2020-01-01T12:00:00+03:00")).unwrap();
    let first = doc.timestamp("updated").unwrap().unwrap();

    doc.set("updated_offset", json!(-2)).unwrap();
    let second = doc.timestamp("updated").unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(second.hour(), 7);
    assert_eq!(second.offset().local_minus_utc(), -2 * 3600);
}

#[test]
fn permissive_policy_keeps_raw_minutes_for_odd_offsets() {
    let odd = at("2020-01-01T00:17:00+00:17");

    let mut hours = Document::new(schema());
    hours.set_timestamp("updated", odd).unwrap();
    assert_eq!(hours.timestamp("updated").unwrap(), Some(odd));
    assert_eq!(
        hours.timestamp("updated").unwrap().unwrap().offset().local_minus_utc(),
        17 * 60
    );

    let mut permissive = Document::new(schema_with(OffsetPolicy::Permissive));
    permissive.set_timestamp("updated", odd).unwrap();
    assert_eq!(permissive.get("updated_offset").unwrap(), json!(17));
    // Raw minutes are read back as hours.
    let restored = permissive.timestamp("updated").unwrap().unwrap();
    assert_eq!(restored.offset().local_minus_utc(), 17 * 3600);
}

#[test]
fn seventeen_hour_offset_is_whole_hours_under_both_policies() {
    let far = at("2020-06-01T23:00:00+17:00");
    for policy in [OffsetPolicy::Hours, OffsetPolicy::Permissive] {
        let mut doc = Document::new(schema_with(policy));
        doc.set_timestamp("updated", far).unwrap();
        assert_eq!(doc.get("updated_offset").unwrap(), json!(17));
        assert_eq!(doc.timestamp("updated").unwrap(), Some(far));
    }
}
