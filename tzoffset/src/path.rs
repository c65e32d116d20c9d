//! Deep access to dot-separated paths inside a JSON document.
//!
//! `when.created_utc` addresses `{"when": {"created_utc": ...}}`. Reads are
//! forgiving (anything missing along the way reads as absent) while writes
//! create intermediate objects and fail fast when a path runs through a
//! scalar or an array.

use serde_json::{Map, Value};

use crate::errors::{SchemaError, SchemaResult};

/// Splits a field path into its segments, rejecting empty ones.
pub fn split_path(path: &str) -> SchemaResult<Vec<&str>> {
    if path.is_empty() {
        return Err(SchemaError::invalid_path(path, "path cannot be empty"));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(SchemaError::invalid_path(path, "path contains an empty segment"));
    }
    Ok(segments)
}

/// Reads the value at `path`, or `None` when any segment is missing or null.
pub fn deep_get<'a>(root: &'a Value, path: &str) -> SchemaResult<Option<&'a Value>> {
    let mut current = root;
    for segment in split_path(path)? {
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(Value::Null) | None => return Ok(None),
            Some(next) => current = next,
        }
    }
    Ok(Some(current))
}

pub fn deep_get_mut<'a>(root: &'a mut Value, path: &str) -> SchemaResult<Option<&'a mut Value>> {
    let mut current = root;
    for segment in split_path(path)? {
        match current.as_object_mut().and_then(|map| map.get_mut(segment)) {
            Some(Value::Null) | None => return Ok(None),
            Some(next) => current = next,
        }
    }
    Ok(Some(current))
}

/// Assigns `value` at `path`, creating intermediate objects for missing or
/// null segments. Returns the root so calls can be chained.
pub fn deep_set<'a>(root: &'a mut Value, path: &str, value: Value) -> SchemaResult<&'a mut Value> {
    let segments = split_path(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| SchemaError::invalid_path(path, "path cannot be empty"))?;
    let parent = parent_map_mut(root, path, parents)?;
    parent.insert((*last).to_string(), value);
    Ok(root)
}

/// Removes and returns the value at `path`. Missing intermediates are a no-op.
pub fn deep_remove(root: &mut Value, path: &str) -> SchemaResult<Option<Value>> {
    let segments = split_path(path)?;
    let Some((last, parents)) = segments.split_last() else {
        return Ok(None);
    };
    let mut current = root;
    for segment in parents {
        match current.as_object_mut().and_then(|map| map.get_mut(*segment)) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(current.as_object_mut().and_then(|map| map.shift_remove(*last)))
}

fn parent_map_mut<'a>(
    root: &'a mut Value,
    path: &str,
    segments: &[&str],
) -> SchemaResult<&'a mut Map<String, Value>> {
    let mut current = root;
    let mut walked = "";
    for segment in segments {
        let map = current.as_object_mut().ok_or_else(|| SchemaError::NotAContainer {
            path: path.to_string(),
            segment: walked.to_string(),
        })?;
        let slot = map.entry((*segment).to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        current = slot;
        walked = *segment;
    }
    current.as_object_mut().ok_or_else(|| SchemaError::NotAContainer {
        path: path.to_string(),
        segment: walked.to_string(),
    })
}
