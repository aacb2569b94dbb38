//! Document info command - shows origin actor, change count, heads and size.

use replidoc::Document;

use crate::cli::InfoArgs;
use crate::commands::CommandResult;
use crate::output::{OutputFormat, print_json};

/// Run the info command
pub fn run(args: &InfoArgs, format: OutputFormat) -> CommandResult {
    let bytes = std::fs::read(&args.file)?;
    let origin = Document::saved_actor(&bytes)?;
    let doc = Document::load(&bytes)?;

    let heads: Vec<String> = doc.heads().iter().map(|h| h.to_string()).collect();
    let keys = doc.map_size("$")?;

    match format {
        OutputFormat::Human => {
            println!("Saved by:    {origin}");
            println!("Changes:     {}", doc.num_changes());
            println!("Root keys:   {keys}");
            println!("Size:        {} bytes", bytes.len());
            println!("Heads:       {}", heads.len());
            for head in &heads {
                println!("  {head}");
            }
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "actor": origin.to_string(),
                "changes": doc.num_changes(),
                "root_keys": keys,
                "bytes": bytes.len(),
                "heads": heads,
            }))?;
        }
    }

    Ok(())
}
