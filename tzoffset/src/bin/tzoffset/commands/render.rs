use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use tzoffset::{Document, SerializeOptions};

use super::{PluginArgs, load_schema};
use crate::output::OutputManager;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON schema definition
    pub definition: PathBuf,

    /// JSON document to load through the computed setters
    pub document: PathBuf,

    /// Print stored data only, without computed fields
    #[arg(long, conflicts_with = "hide_stored")]
    pub lean: bool,

    /// Drop the _utc/_offset pair from the output once the computed field is rendered
    #[arg(long)]
    pub hide_stored: bool,

    #[command(flatten)]
    pub plugin: PluginArgs,
}

pub fn handle_render(args: RenderArgs, output: &OutputManager) -> Result<()> {
    let options = args.plugin.options()?;
    let (schema, _) = load_schema(&args.definition, &options)?;

    let content = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read document {}", args.document.display()))?;
    let input: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document {}", args.document.display()))?;

    let document = Document::from_value(Arc::new(schema), input)?;
    let rendered = if args.lean {
        document.lean().clone()
    } else if args.hide_stored {
        document.to_object_with(SerializeOptions::with_virtuals().hiding_stored_parts())?
    } else {
        document.to_object()?
    };

    output.info(if args.lean { "Stored form" } else { "Object form" });
    output.json(&rendered)
}
