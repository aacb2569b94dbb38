//! JSON export command.

use crate::cli::JsonArgs;
use crate::commands::{CommandResult, load};

/// Run the json command
pub fn run(args: &JsonArgs) -> CommandResult {
    let doc = load(&args.file)?;
    println!("{}", doc.to_json_string(args.pretty)?);
    Ok(())
}
