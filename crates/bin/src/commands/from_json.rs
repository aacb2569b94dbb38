//! JSON import command.

use replidoc::Document;
use tracing::info;

use crate::cli::FromJsonArgs;
use crate::commands::CommandResult;
use crate::output::{OutputFormat, print_json};

/// Run the from-json command
pub fn run(args: &FromJsonArgs, format: OutputFormat) -> CommandResult {
    let json = std::fs::read_to_string(&args.input)?;
    let doc = Document::from_json(&json)?;
    doc.save_to_file(&args.output)?;
    info!(actor = %doc.actor(), output = %args.output.display(), "Created document from JSON");

    match format {
        OutputFormat::Human => println!(
            "Wrote {} ({} root keys)",
            args.output.display(),
            doc.map_size("$")?
        ),
        OutputFormat::Json => print_json(&serde_json::json!({
            "output": args.output.display().to_string(),
            "actor": doc.actor().to_string(),
            "changes": doc.num_changes(),
        }))?,
    }
    Ok(())
}
