use serde::{Deserialize, Serialize};

/// Declared type of a stored schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
    /// Absolute instant. The only type selected for offset rewriting by default.
    #[serde(alias = "date", alias = "timestamp")]
    DateTime,
}

impl FieldType {
    /// Parses the type names accepted in schema definitions.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Some(FieldType::String),
            "number" | "float" | "int" | "integer" => Some(FieldType::Number),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            "object" | "mixed" => Some(FieldType::Object),
            "date" | "datetime" | "timestamp" => Some(FieldType::DateTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::DateTime => "datetime",
        }
    }
}

/// A stored field declared on a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Dot-separated path of the field inside a document.
    pub path: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path: path.into(),
            field_type,
        }
    }

    pub fn is_datetime(&self) -> bool {
        self.field_type == FieldType::DateTime
    }
}

/// Controls how a document is rendered for one output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializeOptions {
    /// Include computed fields in the output.
    #[serde(default)]
    pub virtuals: bool,
    /// When virtuals are included, drop the stored values each computed field is derived from.
    #[serde(default)]
    pub hide_stored_parts: bool,
}

impl SerializeOptions {
    /// Stored data only, the shape a raw/lean read returns.
    pub const LEAN: SerializeOptions = SerializeOptions {
        virtuals: false,
        hide_stored_parts: false,
    };

    pub fn with_virtuals() -> Self {
        Self {
            virtuals: true,
            hide_stored_parts: false,
        }
    }

    pub fn hiding_stored_parts(mut self) -> Self {
        self.hide_stored_parts = true;
        self
    }
}

/// Per-schema output defaults for the object and JSON text forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializationConfig {
    #[serde(default)]
    pub to_object: SerializeOptions,
    #[serde(default)]
    pub to_json: SerializeOptions,
}

impl SerializationConfig {
    /// Computed fields enabled in both output modes.
    pub fn with_virtuals() -> Self {
        Self {
            to_object: SerializeOptions::with_virtuals(),
            to_json: SerializeOptions::with_virtuals(),
        }
    }
}
