//! Handoff - container entry point
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use handoff::cli::{Cli, Commands};
use handoff::config::ConfigManager;
use handoff::error::HandoffResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> HandoffResult<i32> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("handoff=warn"),
        1 => EnvFilter::new("handoff=info"),
        _ => EnvFilter::new("handoff=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    match cli.command {
        Commands::Entrypoint(args) => handoff::cli::commands::entrypoint(args, &config).await,
        Commands::Cache(args) => handoff::cli::commands::cache(args, &config).await.map(|()| 0),
        Commands::Config(args) => handoff::cli::commands::config(args, &config_manager, &config)
            .await
            .map(|()| 0),
    }
}
