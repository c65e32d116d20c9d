use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SchemaError, SchemaResult},
    plugin::OffsetOptions,
};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "tzoffset.toml";

/// Options file layout:
///
/// ```toml
/// [timeoffset]
/// paths = ["when.created"]
/// policy = "hours"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetConfig {
    #[serde(default)]
    pub timeoffset: OffsetOptions,
}

impl OffsetConfig {
    pub fn new(options: OffsetOptions) -> Self {
        Self { timeoffset: options }
    }

    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let config: OffsetConfig = toml::from_str(content).map_err(|err| SchemaError::Config {
            message: format!("failed to parse options: {err}"),
        })?;
        config.timeoffset.validate()?;
        Ok(config)
    }

    /// Loads options from a TOML file, or a JSON file when the extension is `.json`.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| SchemaError::Config {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            let config: OffsetConfig = serde_json::from_str(&content).map_err(|err| SchemaError::Config {
                message: format!("failed to parse {}: {err}", path.display()),
            })?;
            config.timeoffset.validate()?;
            return Ok(config);
        }
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> SchemaResult<String> {
        toml::to_string_pretty(self).map_err(|err| SchemaError::Config {
            message: format!("failed to render options: {err}"),
        })
    }

    pub fn options(&self) -> &OffsetOptions {
        &self.timeoffset
    }

    pub fn into_options(self) -> OffsetOptions {
        self.timeoffset
    }
}
