//! Document instances bound to a [`Schema`].
//!
//! A document holds only stored data. Computed fields are evaluated on every
//! read and decomposed on every write; nothing derived is cached.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Serialize, Serializer, ser::Error as _};
use serde_json::{Map, Value};

use crate::{
    accessor::OffsetAccessor,
    errors::{SchemaError, SchemaResult},
    path::{deep_get, deep_remove, deep_set},
    schema::Schema,
    types::SerializeOptions,
};

#[derive(Debug, Clone)]
pub struct Document {
    schema: Arc<Schema>,
    data: Value,
}

impl Document {
    /// An empty document.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            data: Value::Object(Map::new()),
        }
    }

    /// Builds a document from user input. Values found at computed paths are
    /// routed through their setters; everything else is stored as given.
    pub fn from_value(schema: Arc<Schema>, input: Value) -> SchemaResult<Self> {
        let mut data = expect_object(input)?;
        let mut assignments = Vec::new();
        for computed in schema.computed_fields() {
            if let Some(value) = deep_remove(&mut data, &computed.path)? {
                assignments.push((Arc::clone(&computed.accessor), value));
            }
        }
        let mut document = Self { schema, data };
        for (accessor, value) in assignments {
            accessor.set(&mut document.data, &value)?;
        }
        Ok(document)
    }

    /// Wraps data that is already in stored form, e.g. a record loaded from storage.
    pub fn from_stored(schema: Arc<Schema>, data: Value) -> SchemaResult<Self> {
        Ok(Self {
            schema,
            data: expect_object(data)?,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Reads a computed or stored value. Absent values read as `Value::Null`.
    pub fn get(&self, path: &str) -> SchemaResult<Value> {
        if let Some(computed) = self.schema.computed(path) {
            return computed.accessor.get(&self.data);
        }
        Ok(deep_get(&self.data, path)?.cloned().unwrap_or(Value::Null))
    }

    /// Writes a computed or stored value.
    pub fn set(&mut self, path: &str, value: Value) -> SchemaResult<&mut Self> {
        match self.schema.computed(path) {
            Some(computed) => computed.accessor.set(&mut self.data, &value)?,
            None => {
                deep_set(&mut self.data, path, value)?;
            }
        }
        Ok(self)
    }

    /// Reads an offset-preserving timestamp field.
    pub fn timestamp(&self, path: &str) -> SchemaResult<Option<DateTime<FixedOffset>>> {
        self.offset_accessor(path)?.read(&self.data)
    }

    /// Writes an offset-preserving timestamp field, keeping the offset `value` carries.
    pub fn set_timestamp<Tz: TimeZone>(&mut self, path: &str, value: DateTime<Tz>) -> SchemaResult<&mut Self> {
        let accessor = self.offset_accessor(path)?.clone();
        accessor.write(&mut self.data, Some(value.fixed_offset()))?;
        Ok(self)
    }

    fn offset_accessor(&self, path: &str) -> SchemaResult<&OffsetAccessor> {
        self.schema
            .computed(path)
            .and_then(|computed| computed.accessor.as_offset())
            .ok_or_else(|| SchemaError::UnknownField { path: path.to_string() })
    }

    /// Stored data without computed fields.
    pub fn lean(&self) -> &Value {
        &self.data
    }

    pub fn into_lean(self) -> Value {
        self.data
    }

    /// Object form using the schema's `to_object` settings.
    pub fn to_object(&self) -> SchemaResult<Value> {
        self.to_object_with(self.schema.serialization().to_object)
    }

    pub fn to_object_with(&self, options: SerializeOptions) -> SchemaResult<Value> {
        let mut output = self.data.clone();
        if !options.virtuals {
            return Ok(output);
        }
        for computed in self.schema.computed_fields() {
            let value = computed.accessor.get(&self.data)?;
            if options.hide_stored_parts {
                for stored in computed.accessor.stored_paths() {
                    if deep_remove(&mut output, &stored)?.is_some() && value.is_null() {
                        prune_empty_parents(&mut output, &stored)?;
                    }
                }
            }
            // Unset computed fields are left out rather than rendered as null.
            if !value.is_null() {
                deep_set(&mut output, &computed.path, value)?;
            }
        }
        Ok(output)
    }

    /// JSON text using the schema's `to_json` settings.
    pub fn to_json(&self) -> SchemaResult<String> {
        self.to_json_with(self.schema.serialization().to_json)
    }

    pub fn to_json_with(&self, options: SerializeOptions) -> SchemaResult<String> {
        Ok(serde_json::to_string(&self.to_object_with(options)?)?)
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_object_with(self.schema.serialization().to_json)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Drops the parents of `path` that were left as empty objects, deepest first.
fn prune_empty_parents(output: &mut Value, path: &str) -> SchemaResult<()> {
    let mut parent = path;
    while let Some((prefix, _)) = parent.rsplit_once('.') {
        let emptied = deep_get(output, prefix)?.and_then(Value::as_object).is_some_and(Map::is_empty);
        if !emptied {
            break;
        }
        deep_remove(output, prefix)?;
        parent = prefix;
    }
    Ok(())
}

fn expect_object(value: Value) -> SchemaResult<Value> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(SchemaError::InvalidDocument {
            message: format!("expected an object, found {other}"),
        }),
    }
}
