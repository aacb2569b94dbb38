//! Merge command - folds several saved documents into one.

use tracing::info;

use crate::cli::MergeArgs;
use crate::commands::{CommandResult, load};
use crate::output::{OutputFormat, print_json};

/// Run the merge command
pub fn run(args: &MergeArgs, format: OutputFormat) -> CommandResult {
    let (base, others) = args
        .inputs
        .split_first()
        .ok_or("merge needs at least one input")?;
    let mut merged = load(base)?;

    let mut applied = 0;
    for path in others {
        let other = load(path)?;
        let count = merged.merge(&other)?;
        info!(file = %path.display(), applied = count, "Merged document");
        applied += count;
    }
    merged.save_to_file(&args.output)?;

    match format {
        OutputFormat::Human => {
            println!(
                "Merged {} documents ({applied} new changes, {} total) into {}",
                args.inputs.len(),
                merged.num_changes(),
                args.output.display()
            );
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "inputs": args.inputs.len(),
                "applied": applied,
                "changes": merged.num_changes(),
                "heads": merged.heads().len(),
                "output": args.output.display().to_string(),
            }))?;
        }
    }
    Ok(())
}
