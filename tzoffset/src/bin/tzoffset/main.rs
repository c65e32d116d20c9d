mod commands;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Style},
    },
};

use commands::{
    render::{RenderArgs, handle_render},
    schema::{SchemaArgs, handle_schema},
    split::{SplitArgs, handle_split},
};
use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "tzoffset")]
#[command(version)]
#[command(
    about = "Inspect offset-preserving timestamp fields",
    long_about = r#"Inspect how timestamp fields are stored as a UTC instant plus the offset
they were recorded at.

Commands:
  schema   Show the fields a schema definition is rewritten into
  split    Show what a single timestamp write would store
  render   Load a document through the computed setters and print it

Options files (tzoffset.toml):
  [timeoffset]
  paths = ["when.created"]
  policy = "hours"
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(styles = cli_styles())]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the offset plugin to a schema definition and list the result
    Schema(SchemaArgs),

    /// Decompose one timestamp into its stored UTC instant and offset
    Split(SplitArgs),

    /// Load a JSON document against a schema and print its serialized form
    Render(RenderArgs),
}

fn cli_styles() -> Styles {
    Styles::styled()
        .header(Style::new().bold().fg_color(Some(AnsiColor::BrightBlue.into())))
        .usage(Style::new().bold().fg_color(Some(AnsiColor::BrightBlue.into())))
        .literal(Style::new().fg_color(Some(AnsiColor::BrightCyan.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::BrightBlack.into())))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli.command, &output) {
        output.error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

fn execute(command: Commands, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Schema(args) => handle_schema(args, output),
        Commands::Split(args) => handle_split(args, output),
        Commands::Render(args) => handle_render(args, output),
    }
}
