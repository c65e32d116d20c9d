use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use std::path::PathBuf;

use tzoffset::Schema;

use super::{PluginArgs, load_schema};
use crate::output::{OutputManager, TableDisplay};

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// JSON schema definition, e.g. {"updated": "date", "when": {"created": "date"}}
    pub definition: PathBuf,

    #[command(flatten)]
    pub plugin: PluginArgs,
}

#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub path: String,
    pub field_type: String,
}

#[derive(Debug, Serialize)]
pub struct ComputedRow {
    pub path: String,
    pub utc_field: String,
    pub offset_field: String,
    pub policy: String,
}

/// Resulting schema after the offset plugin ran
#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub rewritten: Vec<String>,
    pub fields: Vec<FieldRow>,
    pub computed: Vec<ComputedRow>,
}

impl SchemaReport {
    pub fn from_schema(schema: &Schema, rewritten: Vec<String>) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|field| FieldRow {
                path: field.path.clone(),
                field_type: field.field_type.as_str().to_string(),
            })
            .collect();
        let computed = schema
            .computed_fields()
            .iter()
            .filter_map(|computed| computed.accessor.as_offset())
            .map(|accessor| ComputedRow {
                path: accessor.path().to_string(),
                utc_field: accessor.utc_path().to_string(),
                offset_field: accessor.offset_path().to_string(),
                policy: accessor.policy().to_string(),
            })
            .collect();
        Self {
            rewritten,
            fields,
            computed,
        }
    }
}

impl TableDisplay for SchemaReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["Field", "Kind", "Derived from"]);
        for field in &self.fields {
            table.add_row(vec![
                Cell::new(&field.path),
                Cell::new(&field.field_type),
                Cell::new(""),
            ]);
        }
        for computed in &self.computed {
            table.add_row(vec![
                Cell::new(&computed.path),
                Cell::new(format!("computed ({})", computed.policy)),
                Cell::new(format!("{} + {}", computed.utc_field, computed.offset_field)),
            ]);
        }
        table
    }
}

pub fn handle_schema(args: SchemaArgs, output: &OutputManager) -> Result<()> {
    let options = args.plugin.options()?;
    let (schema, rewritten) = load_schema(&args.definition, &options)?;

    if rewritten.is_empty() {
        output.warning("No timestamp fields selected; schema unchanged");
    }

    let report = SchemaReport::from_schema(&schema, rewritten);
    output.heading("Schema");
    output.display(&report)?;
    for path in &report.rewritten {
        output.bullet(&format!("{path} now stores {path}_utc and {path}_offset"));
    }
    output.success(&format!("{} field(s) rewritten", report.rewritten.len()));
    Ok(())
}
