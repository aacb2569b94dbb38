//! Change listing command.

use replidoc::Change;

use crate::cli::ChangesArgs;
use crate::commands::{CommandResult, load};
use crate::output::{OutputFormat, print_json, print_table};

/// Run the changes command
pub fn run(args: &ChangesArgs, format: OutputFormat) -> CommandResult {
    let doc = load(&args.file)?;
    let changes: Vec<&Change> = doc.log().iter().collect();

    match format {
        OutputFormat::Human => {
            if changes.is_empty() {
                println!("No changes.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = changes
                .iter()
                .map(|c| {
                    vec![
                        c.hash().short(),
                        c.actor().to_hex()[..8].to_string(),
                        c.seq().to_string(),
                        c.len().to_string(),
                        c.deps().len().to_string(),
                        c.message().unwrap_or_default().to_string(),
                    ]
                })
                .collect();
            print_table(&["HASH", "ACTOR", "SEQ", "OPS", "DEPS", "MESSAGE"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = changes
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "hash": c.hash().to_string(),
                        "actor": c.actor().to_string(),
                        "seq": c.seq(),
                        "start_op": c.start_op(),
                        "time": c.time(),
                        "ops": c.len(),
                        "deps": c.deps().iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                        "message": c.message(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(entries))?;
        }
    }

    Ok(())
}
