//! Path lookup command.

use crate::cli::GetArgs;
use crate::commands::{CommandResult, load};
use crate::output::{OutputFormat, print_json};

/// Run the get command
pub fn run(args: &GetArgs, format: OutputFormat) -> CommandResult {
    let doc = load(&args.file)?;
    let value = doc.get_json(&args.path)?;

    match (format, &value) {
        (OutputFormat::Human, serde_json::Value::String(s)) => println!("{s}"),
        (OutputFormat::Human, other) => {
            println!("{}", serde_json::to_string_pretty(other)?)
        }
        (OutputFormat::Json, other) => print_json(other)?,
    }
    Ok(())
}
