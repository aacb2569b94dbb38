//! CLI argument definitions for the replidoc binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Output format selection on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// Aligned tables and labelled fields
    Human,
    /// One JSON document per command
    Json,
}

/// Inspect, merge and convert saved replidoc documents
#[derive(Parser, Debug)]
#[command(name = "replidoc")]
#[command(about = "replidoc: replicated JSON documents - inspect and merge saved documents")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human", env = "REPLIDOC_FORMAT")]
    pub format: Format,

    /// Shorthand for `--format json`
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        match (self.json, self.format) {
            (true, _) | (false, Format::Json) => OutputFormat::Json,
            (false, Format::Human) => OutputFormat::Human,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a saved document
    Info(InfoArgs),
    /// Print a saved document as JSON
    Json(JsonArgs),
    /// List the changes in a saved document
    Changes(ChangesArgs),
    /// Print the value at a path
    Get(GetArgs),
    /// Merge saved documents into one
    Merge(MergeArgs),
    /// Create a saved document from a JSON file
    FromJson(FromJsonArgs),
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Saved document
    pub file: PathBuf,
}

/// Arguments for the json command
#[derive(clap::Args, Debug)]
pub struct JsonArgs {
    /// Saved document
    pub file: PathBuf,

    /// Indent the output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Arguments for the changes command
#[derive(clap::Args, Debug)]
pub struct ChangesArgs {
    /// Saved document
    pub file: PathBuf,
}

/// Arguments for the get command
#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Saved document
    pub file: PathBuf,

    /// Path such as `user.tags[0]`; `$` is the whole document
    pub path: String,
}

/// Arguments for the merge command
#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Saved documents; the first one is the base
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Where to write the merged document
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the from-json command
#[derive(clap::Args, Debug)]
pub struct FromJsonArgs {
    /// JSON file holding an object
    pub input: PathBuf,

    /// Where to write the saved document
    #[arg(short, long)]
    pub output: PathBuf,
}
