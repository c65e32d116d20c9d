use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::{Value, json};

use tzoffset::{OffsetAccessor, OffsetPolicy, accessor::parse_timestamp, describe_offset, is_plausible_offset};

use super::parse_policy;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Timestamp to decompose (RFC 3339, naive date-time, or epoch milliseconds)
    pub timestamp: String,

    /// How offsets are stored
    #[arg(long, value_parser = parse_policy, default_value = "hours")]
    pub policy: OffsetPolicy,
}

/// What a write of one timestamp would store
#[derive(Debug, Serialize)]
pub struct SplitReport {
    pub input: String,
    pub utc: Value,
    pub offset: Value,
    pub offset_minutes: i32,
    pub plausible: bool,
    pub policy: OffsetPolicy,
    pub restored: Value,
}

impl TableDisplay for SplitReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["Field", "Value"]);
        let offset_label = self
            .offset
            .as_f64()
            .map(|hours| format!("{} ({})", self.offset, describe_offset(hours)))
            .unwrap_or_else(|| self.offset.to_string());
        table.add_row(vec![Cell::new("value_utc"), Cell::new(display(&self.utc))]);
        table.add_row(vec![Cell::new("value_offset"), Cell::new(offset_label)]);
        table.add_row(vec![Cell::new("value"), Cell::new(display(&self.restored))]);
        table
    }
}

fn display(value: &Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

/// Epoch milliseconds are passed as numbers so they are read as instants, not text
fn input_value(raw: &str) -> Value {
    raw.trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn split(raw: &str, policy: OffsetPolicy) -> Result<Option<SplitReport>> {
    let input = input_value(raw);
    let Some(timestamp) = parse_timestamp("value", &input)? else {
        return Ok(None);
    };
    let minutes = timestamp.offset().local_minus_utc() / 60;

    let accessor = OffsetAccessor::new("value", policy);
    let mut doc = json!({});
    accessor.write(&mut doc, Some(timestamp))?;
    // Permissive raw minutes can be unreadable as hours; report that instead of failing.
    let restored = match accessor.read(&doc) {
        Ok(value) => value.map(|t| Value::String(t.to_rfc3339())).unwrap_or(Value::Null),
        Err(err) => Value::String(err.to_string()),
    };

    Ok(Some(SplitReport {
        input: raw.to_string(),
        utc: doc["value_utc"].clone(),
        offset: doc["value_offset"].clone(),
        offset_minutes: minutes,
        plausible: is_plausible_offset(minutes),
        policy,
        restored,
    }))
}

pub fn handle_split(args: SplitArgs, output: &OutputManager) -> Result<()> {
    let Some(report) = split(&args.timestamp, args.policy)? else {
        output.warning("Empty input: a write would leave the stored fields untouched");
        return Ok(());
    };

    output.heading(&format!("{} {}", ICONS.clock, report.input));
    output.key_value("policy", report.policy.as_str());
    if !report.plausible {
        output.warning(&format!(
            "{} minutes is not a whole or half hour offset",
            report.offset_minutes
        ));
    }
    output.display(&report)?;
    Ok(())
}
