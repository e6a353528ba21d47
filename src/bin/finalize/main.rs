//! finalize - the finalize stage of the .NET Core buildpack

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use dotnet_finalize::util::diagnostic;
use dotnet_finalize::ResolveError;

fn main() {
    let cli = Cli::parse();
    let color = cli.use_color();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        if let Some(resolve) = e.downcast_ref::<ResolveError>() {
            diagnostic::emit(&resolve.to_diagnostic(), color);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("dotnet_finalize=debug")
    } else {
        EnvFilter::new("dotnet_finalize=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = cli.shell();

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &shell),
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Clean(args) => commands::clean::execute(args, &shell),
    }
}
