//! Subcommand implementations.

pub mod changes;
pub mod from_json;
pub mod get;
pub mod info;
pub mod json;
pub mod merge;

use std::path::Path;

use replidoc::Document;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Loads a saved document, naming the file in the error.
pub fn load(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    Document::load_from_file(path)
        .map_err(|e| format!("Failed to load {}: {e}", path.display()).into())
}
