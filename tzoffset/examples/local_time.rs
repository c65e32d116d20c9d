//! Records "now" at a few fixed offsets and prints what was stored.
//!
//! Run with `RUST_LOG=debug cargo run --example local_time` to see the plugin's logging.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use serde_json::json;
use tzoffset::{Document, OffsetOptions, Schema, SchemaError, describe_offset, install};

fn main() -> Result<(), SchemaError> {
    env_logger::init();

    let mut schema = Schema::from_definition(&json!({"when": {"created": "date"}}))?;
    install(&mut schema, &OffsetOptions::default())?;
    let schema = Arc::new(schema);

    let zones = [("Los Angeles (PDT)", -7 * 3600), ("Paris (CEST)", 2 * 3600), ("Kolkata", 19_800)];
    for (label, seconds) in zones {
        let Some(offset) = FixedOffset::east_opt(seconds) else {
            continue;
        };
        let now = Utc::now().with_timezone(&offset);

        let mut doc = Document::new(Arc::clone(&schema));
        doc.set_timestamp("when.created", now)?;

        let local = doc.timestamp("when.created")?;
        let utc = doc.get("when.created_utc")?;
        let hours = doc.get("when.created_offset")?.as_f64().unwrap_or_default();

        println!("{label}");
        if let Some(local) = local {
            println!("  Local time was {}", local.format("%Y-%m-%d %H:%M:%S %:z"));
        }
        println!("  UTC time was {utc}");
        println!("  Local difference from UTC was {hours} ({})", describe_offset(hours));
    }
    Ok(())
}
