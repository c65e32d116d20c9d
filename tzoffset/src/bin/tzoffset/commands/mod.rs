pub mod render;
pub mod schema;
pub mod split;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use tzoffset::{OffsetConfig, OffsetOptions, OffsetPolicy, Schema, config::CONFIG_FILE_NAME, install};

/// Options shared by commands that rewrite a schema
#[derive(Args, Debug, Clone, Default)]
pub struct PluginArgs {
    /// Options file (TOML, or JSON by extension). Defaults to ./tzoffset.toml when present
    #[arg(short, long, env = "TZOFFSET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Field path to rewrite (repeatable). Overrides the paths from the options file
    #[arg(short, long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// How offsets are stored
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<OffsetPolicy>,
}

impl PluginArgs {
    /// Resolve effective options: file (explicit or default), then command-line overrides
    pub fn options(&self) -> Result<OffsetOptions> {
        let default_path = Path::new(CONFIG_FILE_NAME);
        let config_path = match &self.config {
            Some(path) => Some(path.as_path()),
            None if default_path.exists() => Some(default_path),
            None => None,
        };

        let mut options = match config_path {
            Some(path) => OffsetConfig::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?
                .into_options(),
            None => OffsetOptions::default(),
        };

        if !self.paths.is_empty() {
            options.paths = self.paths.clone();
        }
        if let Some(policy) = self.policy {
            options.policy = policy;
        }
        options.validate()?;
        Ok(options)
    }
}

pub fn parse_policy(value: &str) -> Result<OffsetPolicy, String> {
    value.parse::<OffsetPolicy>().map_err(|err| err.to_string())
}

/// Load a JSON schema definition and apply the offset plugin to it
pub fn load_schema(definition: &Path, options: &OffsetOptions) -> Result<(Schema, Vec<String>)> {
    let content = std::fs::read_to_string(definition)
        .with_context(|| format!("Failed to read schema definition {}", definition.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schema definition {}", definition.display()))?;
    let mut schema = Schema::from_definition(&value)?;
    let rewritten = install(&mut schema, options)?;
    Ok((schema, rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_overrides_file_options() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[timeoffset]\npaths = [\"updated\"]\npolicy = \"permissive\"").unwrap();

        let args = PluginArgs {
            config: Some(file.path().to_path_buf()),
            paths: vec!["when.created".to_string()],
            policy: None,
        };
        let options = args.options().unwrap();
        assert_eq!(options.paths, ["when.created"]);
        assert_eq!(options.policy, OffsetPolicy::Permissive);
    }

    #[test]
    fn test_load_schema_rewrites_definition() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"updated": "date", "when": {{"created": "date"}}, "name": "string"}}"#).unwrap();

        let (schema, rewritten) = load_schema(file.path(), &OffsetOptions::default()).unwrap();
        assert_eq!(rewritten.len(), 2);
        assert!(schema.computed("when.created").is_some());
        assert!(!schema.has_field("updated"));
    }

    #[test]
    fn test_policy_parser_reports_unknown_names() {
        assert_eq!(parse_policy("hours"), Ok(OffsetPolicy::Hours));
        assert!(parse_policy("loose").unwrap_err().contains("loose"));
    }
}
