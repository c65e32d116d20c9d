use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    accessor::ComputedAccessor,
    errors::{SchemaError, SchemaResult},
    path::split_path,
    types::{FieldDescriptor, FieldType, SerializationConfig},
};

/// Segments may not contain whitespace and may not start with `$` (reserved for operators).
static SEGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s.$][^\s.]*$").expect("segment pattern is a valid regex"));

/// A virtual field registered on a schema.
#[derive(Debug, Clone)]
pub struct ComputedField {
    pub path: String,
    pub accessor: Arc<dyn ComputedAccessor>,
}

/// Field registry for one document type.
///
/// Stored fields keep their declaration order. Computed fields have no storage
/// of their own and are evaluated against each document on access.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    computed: Vec<ComputedField>,
    serialization: SerializationConfig,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::add_field`].
    pub fn field(mut self, path: &str, field_type: FieldType) -> SchemaResult<Self> {
        self.add_field(path, field_type)?;
        Ok(self)
    }

    /// Declares a stored field. Redeclaring an existing path replaces its type in place.
    pub fn add_field(&mut self, path: &str, field_type: FieldType) -> SchemaResult<&mut Self> {
        validate_field_path(path)?;
        match self.fields.iter_mut().find(|field| field.path == path) {
            Some(existing) => {
                debug!("redefining field '{path}' ({} -> {})", existing.field_type.as_str(), field_type.as_str());
                existing.field_type = field_type;
            }
            None => {
                debug!("adding field '{path}' ({})", field_type.as_str());
                self.fields.push(FieldDescriptor::new(path, field_type));
            }
        }
        Ok(self)
    }

    /// Removes the stored field at `path`. Absent paths are ignored.
    pub fn remove(&mut self, path: &str) -> Option<FieldDescriptor> {
        let index = self.fields.iter().position(|field| field.path == path)?;
        debug!("removing field '{path}'");
        Some(self.fields.remove(index))
    }

    /// Installs a computed field at `path`, replacing any previous accessor there.
    pub fn add_computed(&mut self, path: &str, accessor: Arc<dyn ComputedAccessor>) -> SchemaResult<&mut Self> {
        validate_field_path(path)?;
        debug!("installing computed field '{path}'");
        match self.computed.iter_mut().find(|computed| computed.path == path) {
            Some(existing) => existing.accessor = accessor,
            None => self.computed.push(ComputedField {
                path: path.to_string(),
                accessor,
            }),
        }
        Ok(self)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_descriptor(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.path == path)
    }

    pub fn field_type(&self, path: &str) -> Option<FieldType> {
        self.field_descriptor(path).map(|field| field.field_type)
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.field_descriptor(path).is_some()
    }

    /// Paths of every stored DateTime field, in declaration order.
    pub fn datetime_paths(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.is_datetime())
            .map(|field| field.path.clone())
            .collect()
    }

    pub fn computed_fields(&self) -> &[ComputedField] {
        &self.computed
    }

    pub fn computed(&self, path: &str) -> Option<&ComputedField> {
        self.computed.iter().find(|computed| computed.path == path)
    }

    pub fn serialization(&self) -> SerializationConfig {
        self.serialization
    }

    pub fn set_serialization(&mut self, config: SerializationConfig) -> &mut Self {
        self.serialization = config;
        self
    }

    /// Builds a schema from a nested JSON definition.
    ///
    /// Leaves are type names (`"date"`, `"number"`, ...), `{"type": "<name>"}`
    /// objects or single-element arrays (declared as `array`). Any other object
    /// nests its keys under the parent path.
    ///
    /// ```
    /// use serde_json::json;
    /// use tzoffset::{schema::Schema, types::FieldType};
    ///
    /// let schema = Schema::from_definition(&json!({
    ///     "string": "string",
    ///     "updated": {"type": "date"},
    ///     "when": {"created": "date"}
    /// }))
    /// .unwrap();
    /// assert_eq!(schema.field_type("when.created"), Some(FieldType::DateTime));
    /// ```
    pub fn from_definition(definition: &Value) -> SchemaResult<Self> {
        let object = definition.as_object().ok_or_else(|| SchemaError::InvalidDefinition {
            path: "$".to_string(),
            message: "schema definition must be an object".to_string(),
        })?;
        let mut schema = Schema::new();
        collect_definition(&mut schema, "", object)?;
        Ok(schema)
    }
}

fn collect_definition(schema: &mut Schema, prefix: &str, object: &Map<String, Value>) -> SchemaResult<()> {
    for (key, entry) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match entry {
            Value::String(name) => {
                schema.add_field(&path, parse_type_name(&path, name)?)?;
            }
            Value::Array(_) => {
                schema.add_field(&path, FieldType::Array)?;
            }
            Value::Object(map) => match map.get("type") {
                Some(Value::String(name)) => {
                    schema.add_field(&path, parse_type_name(&path, name)?)?;
                }
                _ if map.is_empty() => {
                    schema.add_field(&path, FieldType::Object)?;
                }
                _ => collect_definition(schema, &path, map)?,
            },
            other => {
                return Err(SchemaError::InvalidDefinition {
                    path,
                    message: format!("expected a type name or nested object, found {other}"),
                });
            }
        }
    }
    Ok(())
}

fn parse_type_name(path: &str, name: &str) -> SchemaResult<FieldType> {
    FieldType::from_name(name).ok_or_else(|| SchemaError::InvalidDefinition {
        path: path.to_string(),
        message: format!("unknown field type '{name}'"),
    })
}

pub(crate) fn validate_field_path(path: &str) -> SchemaResult<()> {
    for segment in split_path(path)? {
        if !SEGMENT_PATTERN.is_match(segment) {
            return Err(SchemaError::invalid_path(
                path,
                format!("segment '{segment}' must not contain whitespace or start with '$'"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{OffsetAccessor, OffsetPolicy};
    use serde_json::json;

    #[test]
    fn fields_keep_declaration_order() {
        let schema = Schema::new()
            .field("string", FieldType::String)
            .and_then(|s| s.field("updated", FieldType::DateTime))
            .and_then(|s| s.field("when.created", FieldType::DateTime))
            .unwrap();
        let paths: Vec<&str> = schema.fields().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["string", "updated", "when.created"]);
        assert_eq!(schema.datetime_paths(), ["updated", "when.created"]);
    }

    #[test]
    fn redefinition_replaces_type_in_place() {
        let mut schema = Schema::new();
        schema.add_field("a", FieldType::String).unwrap();
        schema.add_field("b", FieldType::Number).unwrap();
        schema.add_field("a", FieldType::DateTime).unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].path, "a");
        assert_eq!(schema.field_type("a"), Some(FieldType::DateTime));
    }

    #[test]
    fn removing_absent_field_is_silent() {
        let mut schema = Schema::new().field("a", FieldType::String).unwrap();
        assert!(schema.remove("missing").is_none());
        assert!(schema.remove("a..b").is_none());
        assert_eq!(schema.remove("a").map(|f| f.field_type), Some(FieldType::String));
        assert!(!schema.has_field("a"));
    }

    #[test]
    fn invalid_paths_are_rejected() {
        let mut schema = Schema::new();
        for bad in ["", "a..b", "a.", "$set", "with space", "a.$b"] {
            assert!(
                matches!(schema.add_field(bad, FieldType::String), Err(SchemaError::InvalidPath { .. })),
                "{bad}"
            );
        }
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn computed_fields_replace_by_path() {
        let mut schema = Schema::new();
        schema
            .add_computed("t", Arc::new(OffsetAccessor::new("t", OffsetPolicy::Hours)))
            .unwrap();
        schema
            .add_computed("t", Arc::new(OffsetAccessor::new("t", OffsetPolicy::Permissive)))
            .unwrap();
        assert_eq!(schema.computed_fields().len(), 1);
        let accessor = schema.computed("t").and_then(|c| c.accessor.as_offset()).unwrap();
        assert_eq!(accessor.policy(), OffsetPolicy::Permissive);
    }

    #[test]
    fn definition_supports_nesting_and_type_objects() {
        let schema = Schema::from_definition(&json!({
            "string": {"type": "String"},
            "updated": "Date",
            "tags": ["string"],
            "meta": {},
            "when": {"created": {"type": "date"}, "count": "number"}
        }))
        .unwrap();
        assert_eq!(schema.field_type("string"), Some(FieldType::String));
        assert_eq!(schema.field_type("updated"), Some(FieldType::DateTime));
        assert_eq!(schema.field_type("tags"), Some(FieldType::Array));
        assert_eq!(schema.field_type("meta"), Some(FieldType::Object));
        assert_eq!(schema.field_type("when.created"), Some(FieldType::DateTime));
        assert_eq!(schema.field_type("when.count"), Some(FieldType::Number));
        assert!(!schema.has_field("when"));
    }

    #[test]
    fn definition_keeps_written_order() {
        let schema = Schema::from_definition(&json!({
            "zeta": "date",
            "alpha": "date",
            "mid": "string",
            "when": {"updated": "date", "created": "date"}
        }))
        .unwrap();
        let paths: Vec<&str> = schema.fields().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["zeta", "alpha", "mid", "when.updated", "when.created"]);
        assert_eq!(
            crate::plugin::select_fields(&schema, &Default::default()),
            ["zeta", "alpha", "when.updated", "when.created"]
        );
    }

    #[test]
    fn definition_rejects_unknown_types() {
        let err = Schema::from_definition(&json!({"when": {"created": "moment"}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition { ref path, .. } if path == "when.created"));
        assert!(Schema::from_definition(&json!({"n": 5})).is_err());
        assert!(Schema::from_definition(&json!(["date"])).is_err());
    }
}
