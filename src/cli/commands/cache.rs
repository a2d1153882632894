//! Cache command - reset or list cache buckets

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::HandoffResult;
use crate::worker::{CacheStorage, DirCacheStorage, NoClients, ServiceWorker};
use console::style;
use std::path::PathBuf;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> HandoffResult<()> {
    match args.action {
        CacheAction::Reset { root } => reset(storage(root, config)).await,
        CacheAction::List { root, format } => list(&storage(root, config), format).await,
    }
}

fn storage(root: Option<PathBuf>, config: &Config) -> DirCacheStorage {
    DirCacheStorage::new(root.unwrap_or_else(|| config.cache.root.clone()))
}

/// Run a worker through install and activate
async fn reset(storage: DirCacheStorage) -> HandoffResult<()> {
    let root = storage.root().to_path_buf();
    let mut worker = ServiceWorker::new(storage, NoClients);

    worker.install().await;
    let outcome = worker.activate().await;

    if let Some(error) = &outcome.cache_error {
        println!(
            "{} Cache reset incomplete in {}: {}",
            style("!").yellow(),
            root.display(),
            error
        );
    }
    println!(
        "{} Deleted {} cache bucket(s) in {}",
        style("✓").green(),
        outcome.deleted,
        style(root.display()).cyan()
    );

    Ok(())
}

async fn list(storage: &DirCacheStorage, format: OutputFormat) -> HandoffResult<()> {
    let names = storage.keys().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Plain => {
            for name in &names {
                println!("{}", name);
            }
        }
        OutputFormat::Table => {
            if names.is_empty() {
                println!("No cache buckets found.");
                return Ok(());
            }
            println!("{:<40}", "BUCKET");
            println!("{}", "-".repeat(40));
            for name in &names {
                println!("{:<40}", name);
            }
            println!();
            println!("Total: {} bucket(s)", names.len());
        }
    }

    Ok(())
}
