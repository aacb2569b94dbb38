use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() {
    // Initialize tracing on stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("replidoc=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.output_format();

    let result = match &cli.command {
        Commands::Info(args) => commands::info::run(args, format),
        Commands::Json(args) => commands::json::run(args),
        Commands::Changes(args) => commands::changes::run(args, format),
        Commands::Get(args) => commands::get::run(args, format),
        Commands::Merge(args) => commands::merge::run(args, format),
        Commands::FromJson(args) => commands::from_json::run(args, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
