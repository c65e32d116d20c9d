//! Rewrites timestamp fields into offset-preserving pairs.
//!
//! For every selected path `p` the schema loses the stored field `p`, gains
//! `p_utc` (datetime) and `p_offset` (number), and gets a computed field at `p`
//! backed by an [`OffsetAccessor`].

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    accessor::{OFFSET_SUFFIX, OffsetAccessor, OffsetPolicy, UTC_SUFFIX},
    errors::SchemaResult,
    schema::{Schema, validate_field_path},
    types::{FieldType, SerializationConfig},
};

/// Options accepted by [`install`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetOptions {
    /// Paths to rewrite. Empty selects every datetime field.
    pub paths: Vec<String>,
    pub policy: OffsetPolicy,
}

impl OffsetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_policy(mut self, policy: OffsetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks that every explicit path is well formed.
    pub fn validate(&self) -> SchemaResult<()> {
        for path in &self.paths {
            validate_field_path(path)?;
        }
        Ok(())
    }
}

/// Paths to rewrite: the explicit list when one is given, otherwise every datetime field.
pub fn select_fields(schema: &Schema, options: &OffsetOptions) -> Vec<String> {
    if options.paths.is_empty() {
        return schema.datetime_paths();
    }
    let mut selected: Vec<String> = Vec::with_capacity(options.paths.len());
    for path in &options.paths {
        if selected.contains(path) {
            continue;
        }
        if schema.field_type(path) != Some(FieldType::DateTime) {
            warn!("'{path}' is not a declared datetime field; rewriting it anyway");
        }
        selected.push(path.clone());
    }
    selected
}

/// Replaces each path with its `_utc`/`_offset` pair and a computed accessor.
///
/// All paths are validated before the schema is touched.
pub fn rewrite(schema: &mut Schema, paths: &[String], policy: OffsetPolicy) -> SchemaResult<()> {
    for path in paths {
        validate_field_path(path)?;
    }
    for path in paths {
        schema.remove(path);
        schema.add_field(&format!("{path}{UTC_SUFFIX}"), FieldType::DateTime)?;
        schema.add_field(&format!("{path}{OFFSET_SUFFIX}"), FieldType::Number)?;
        schema.add_computed(path, Arc::new(OffsetAccessor::new(path.as_str(), policy)))?;
    }
    Ok(())
}

/// Selects, rewrites and enables computed fields in both output modes.
/// Returns the rewritten paths.
pub fn install(schema: &mut Schema, options: &OffsetOptions) -> SchemaResult<Vec<String>> {
    options.validate()?;
    let paths = select_fields(schema, options);
    rewrite(schema, &paths, options.policy)?;
    schema.set_serialization(SerializationConfig::with_virtuals());
    debug!("offset fields installed for {paths:?} ({} policy)", options.policy);
    Ok(paths)
}
