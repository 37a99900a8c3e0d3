use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod store;

use cli::{Cli, Commands};
use output::OutputFormat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("datasets=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    match &cli.command {
        Commands::Tokens(args) => commands::tokens::run(args, format),
        Commands::Eval(args) => commands::eval::run(args, format),
        Commands::Tree(args) => commands::tree::run(args, format),
        Commands::Resolve(args) => commands::resolve::run(args, format),
    }
}
