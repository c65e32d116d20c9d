//! Computed timestamp fields backed by a UTC instant and an hour offset.
//!
//! A field `when.created` is stored as `when.created_utc` (RFC 3339, always
//! `Z`) and `when.created_offset` (signed hours, e.g. `2`, `-5.5`). Reading
//! the computed field rebuilds a `DateTime<FixedOffset>` that is the same
//! instant as the stored UTC value, shown at the recorded offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{SchemaError, SchemaResult},
    path::{deep_get, deep_set},
};

/// Suffix of the stored field holding the UTC instant.
pub const UTC_SUFFIX: &str = "_utc";
/// Suffix of the stored field holding the offset in hours.
pub const OFFSET_SUFFIX: &str = "_offset";

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Getter/setter pair for a virtual field, invoked with the owning document.
pub trait ComputedAccessor: fmt::Debug + Send + Sync {
    /// Derives the field value from the stored document. `Value::Null` when unset.
    fn get(&self, doc: &Value) -> SchemaResult<Value>;

    /// Decomposes `value` into the stored fields of `doc`.
    fn set(&self, doc: &mut Value, value: &Value) -> SchemaResult<()>;

    /// Stored paths the computed value is derived from.
    fn stored_paths(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_offset(&self) -> Option<&OffsetAccessor> {
        None
    }
}

/// How the offset of a written timestamp is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OffsetPolicy {
    /// Always store `minutes / 60`.
    #[default]
    Hours,
    /// Store `minutes / 60` for plausible offsets and the raw minute count otherwise.
    /// Raw values read back as hours, so an implausible offset does not round-trip.
    Permissive,
}

impl OffsetPolicy {
    /// Value stored in the offset field for an offset of `minutes`.
    pub fn stored_offset(self, minutes: i32) -> f64 {
        match self {
            OffsetPolicy::Hours => f64::from(minutes) / 60.0,
            OffsetPolicy::Permissive if is_plausible_offset(minutes) => f64::from(minutes) / 60.0,
            OffsetPolicy::Permissive => f64::from(minutes),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetPolicy::Hours => "hours",
            OffsetPolicy::Permissive => "permissive",
        }
    }
}

impl FromStr for OffsetPolicy {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hours" => Ok(OffsetPolicy::Hours),
            "permissive" => Ok(OffsetPolicy::Permissive),
            other => Err(SchemaError::Config {
                message: format!("unknown offset policy '{other}' (expected 'hours' or 'permissive')"),
            }),
        }
    }
}

impl TryFrom<String> for OffsetPolicy {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OffsetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an offset in minutes looks like a real clock offset: whole hours,
/// or a half hour within +/-16h.
pub fn is_plausible_offset(minutes: i32) -> bool {
    if minutes % 60 == 0 {
        return true;
    }
    let hours = f64::from(minutes) / 60.0;
    hours > -16.0 && hours < 16.0 && minutes.rem_euclid(60) == 30
}

/// Formats an hour offset as `+HH:MM`.
pub fn describe_offset(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    let sign = if minutes < 0 { '-' } else { '+' };
    let minutes = minutes.abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Interprets a JSON value as a timestamp.
///
/// Falsy values (`null`, `false`, `0`, `""`) are `None`. RFC 3339 strings keep
/// their offset; naive date-times, dates and epoch milliseconds are taken as UTC.
pub fn parse_timestamp(path: &str, value: &Value) -> SchemaResult<Option<DateTime<FixedOffset>>> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Err(SchemaError::invalid_timestamp(path, "boolean is not a timestamp")),
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| SchemaError::invalid_timestamp(path, format!("{number} is out of range")))?;
            if millis == 0 {
                return Ok(None);
            }
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|utc| Some(utc.fixed_offset()))
                .ok_or_else(|| SchemaError::invalid_timestamp(path, format!("{millis}ms is out of range")))
        }
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => parse_timestamp_str(text.trim())
            .map(Some)
            .ok_or_else(|| SchemaError::invalid_timestamp(path, format!("unrecognised timestamp '{text}'"))),
        Value::Array(_) | Value::Object(_) => Err(SchemaError::invalid_timestamp(
            path,
            "expected a string or epoch milliseconds",
        )),
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn offset_hours(path: &str, value: Option<&Value>) -> SchemaResult<f64> {
    let hours = match value {
        None => return Ok(0.0),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    hours
        .filter(|hours| hours.is_finite())
        .ok_or_else(|| SchemaError::invalid_offset(path, "offset must be a number of hours"))
}

fn offset_value(stored: f64) -> Value {
    if stored.fract() == 0.0 && stored.abs() < i64::MAX as f64 {
        Value::from(stored as i64)
    } else {
        Value::from(stored)
    }
}

/// Computed field over a `<path>_utc` / `<path>_offset` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetAccessor {
    path: String,
    utc_path: String,
    offset_path: String,
    policy: OffsetPolicy,
}

impl OffsetAccessor {
    pub fn new(path: impl Into<String>, policy: OffsetPolicy) -> Self {
        let path = path.into();
        Self {
            utc_path: format!("{path}{UTC_SUFFIX}"),
            offset_path: format!("{path}{OFFSET_SUFFIX}"),
            path,
            policy,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn utc_path(&self) -> &str {
        &self.utc_path
    }

    pub fn offset_path(&self) -> &str {
        &self.offset_path
    }

    pub fn policy(&self) -> OffsetPolicy {
        self.policy
    }

    /// Rebuilds the timestamp at its recorded offset, or `None` when no UTC value is stored.
    pub fn read(&self, doc: &Value) -> SchemaResult<Option<DateTime<FixedOffset>>> {
        let Some(utc_raw) = deep_get(doc, &self.utc_path)? else {
            return Ok(None);
        };
        let Some(utc) = parse_timestamp(&self.utc_path, utc_raw)? else {
            return Ok(None);
        };
        let hours = offset_hours(&self.offset_path, deep_get(doc, &self.offset_path)?)?;
        let minutes = (hours * 60.0).round();
        if minutes.abs() >= MINUTES_PER_DAY as f64 {
            return Err(SchemaError::invalid_offset(
                &self.offset_path,
                format!("{hours} hours is not a representable clock offset"),
            ));
        }
        let offset = FixedOffset::east_opt(minutes as i32 * 60).ok_or_else(|| {
            SchemaError::invalid_offset(&self.offset_path, format!("{hours} hours is not a clock offset"))
        })?;
        Ok(Some(utc.with_timezone(&offset)))
    }

    /// Stores `value` as a UTC instant plus the offset it carried, at minute precision.
    /// `None` leaves the document untouched.
    pub fn write(&self, doc: &mut Value, value: Option<DateTime<FixedOffset>>) -> SchemaResult<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let seconds = value.offset().local_minus_utc();
        if seconds % 60 != 0 {
            warn!(
                "offset of {seconds} seconds at '{}' is kept at minute precision",
                self.path
            );
        }
        let minutes = seconds / 60;
        let stored = self.policy.stored_offset(minutes);
        if self.policy == OffsetPolicy::Permissive && !is_plausible_offset(minutes) {
            warn!(
                "offset of {minutes} minutes at '{}' is not a plausible clock offset; storing raw minutes",
                self.path
            );
        }

        let utc = value.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true);
        deep_set(doc, &self.utc_path, Value::String(utc))?;
        deep_set(doc, &self.offset_path, offset_value(stored))?;
        debug!("stored '{}' with offset {stored}", self.path);
        Ok(())
    }
}

impl ComputedAccessor for OffsetAccessor {
    fn get(&self, doc: &Value) -> SchemaResult<Value> {
        Ok(self
            .read(doc)?
            .map(|timestamp| Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)))
            .unwrap_or(Value::Null))
    }

    fn set(&self, doc: &mut Value, value: &Value) -> SchemaResult<()> {
        let timestamp = parse_timestamp(&self.path, value)?;
        self.write(doc, timestamp)
    }

    fn stored_paths(&self) -> Vec<String> {
        vec![self.utc_path.clone(), self.offset_path.clone()]
    }

    fn as_offset(&self) -> Option<&OffsetAccessor> {
        Some(self)
    }
}
