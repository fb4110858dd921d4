//! Sync command implementation.

use gistmirror_engine::{
    ItemOutcome, MirrorConfig, MirrorEngine, RunOutcome, RunReport, IDENTITY_ENV_VARS,
};
use gistmirror_store::FileStore;
use std::path::Path;
use std::sync::Arc;

/// Options of the sync command.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Explicit username.
    pub username: Option<String>,
    /// Fetch concurrency bound.
    pub concurrency: Option<usize>,
    /// API endpoint override.
    pub api_url: Option<String>,
    /// Preview instead of writing.
    pub dry_run: bool,
}

/// Builds the engine configuration from command options.
///
/// `env` looks up an environment variable; every variable of
/// [`IDENTITY_ENV_VARS`] that is set becomes a fallback identity, in order.
pub fn build_config<F>(options: &SyncOptions, env: F) -> MirrorConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = MirrorConfig::new()
        .with_identity_fallbacks(IDENTITY_ENV_VARS.iter().filter_map(|name| env(*name)));
    if let Some(username) = &options.username {
        config = config.with_username(username.clone());
    }
    if let Some(limit) = options.concurrency {
        config = config.with_max_concurrent_fetches(limit);
    }
    if let Some(url) = &options.api_url {
        config = config.with_api_base_url(url.clone());
    }
    config
}

/// Runs the sync command.
pub async fn run(path: &Path, options: SyncOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&options, |name| std::env::var(name).ok());
    let remote = Arc::new(config.http_remote()?);
    let Some(store) = open_store(path, options.dry_run)? else {
        println!("No store at {}; run `gistmirror init` first", path.display());
        return Ok(());
    };
    let engine = MirrorEngine::new(config, Arc::new(store), remote);

    if options.dry_run {
        let Some(plan) = engine.plan().await? else {
            println!("No mirror root in {}; run `gistmirror init` first", path.display());
            return Ok(());
        };
        println!("Dry run for {} (root {})", plan.username, plan.root);
        for item in &plan.items {
            println!("  {:<9} {}  {}", action_label(item.action), item.item_id, item.title);
        }
        return Ok(());
    }

    let report = engine.run().await?;
    print_report(path, &report);
    Ok(())
}

/// Opens the store at `path`. A dry run never creates a missing snapshot.
fn open_store(
    path: &Path,
    dry_run: bool,
) -> Result<Option<FileStore>, Box<dyn std::error::Error>> {
    if dry_run && !path.exists() {
        return Ok(None);
    }
    Ok(Some(FileStore::open(path)?))
}

fn action_label(action: ItemOutcome) -> &'static str {
    match action {
        ItemOutcome::Created => "create",
        ItemOutcome::Updated => "update",
        ItemOutcome::Unchanged => "unchanged",
    }
}

fn print_report(path: &Path, report: &RunReport) {
    if report.outcome == RunOutcome::NotConfigured {
        println!("No mirror root in {}; run `gistmirror init` first", path.display());
        return;
    }

    println!(
        "Mirrored {} item(s) for {} in {:.2?}",
        report.items.len() + report.failed(),
        report.username.as_deref().unwrap_or("?"),
        report.duration
    );
    println!("  Created:   {}", report.created());
    println!("  Updated:   {}", report.updated());
    println!("  Unchanged: {}", report.unchanged());
    if !report.is_clean() {
        println!("  Failed items: {}", report.failed());
        println!("  Failed files: {}", report.failed_files());
        for failure in &report.failures {
            println!("    {}: {}", failure.item_id, failure.error);
        }
    }
}
