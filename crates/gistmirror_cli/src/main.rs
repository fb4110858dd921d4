//! gistmirror CLI
//!
//! Mirrors a user's remote snippet collection into a note store file.
//!
//! # Commands
//!
//! - `init` - Create the mirror root in a store
//! - `sync` - Run one mirror pass (or preview it with `--dry-run`)
//! - `show` - Print the mirrored subtree
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mirror a remote snippet collection into a note store.
#[derive(Parser)]
#[command(name = "gistmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store snapshot file
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the mirror root unless one exists
    Init {
        /// Remote account to mirror
        #[arg(short, long)]
        username: Option<String>,

        /// Title of the mirror root
        #[arg(short, long, default_value = "Gists")]
        title: String,
    },

    /// Run one mirror pass
    Sync {
        /// Remote account, used when the root carries none
        #[arg(short, long)]
        username: Option<String>,

        /// Maximum raw fetches in flight
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// API endpoint of the snippet service
        #[arg(long)]
        api_url: Option<String>,

        /// Dry run - show what would be done
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Print the mirrored subtree
    Show {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Init { username, title } => {
            let path = cli.store.ok_or("Store path required for init")?;
            commands::init::run(&path, username.as_deref(), &title)?;
        }
        Commands::Sync {
            username,
            concurrency,
            api_url,
            dry_run,
        } => {
            let path = cli.store.ok_or("Store path required for sync")?;
            let options = commands::sync::SyncOptions {
                username,
                concurrency,
                api_url,
                dry_run,
            };
            commands::sync::run(&path, options).await?;
        }
        Commands::Show { format } => {
            let path = cli.store.ok_or("Store path required for show")?;
            commands::show::run(&path, &format)?;
        }
        Commands::Version => {
            println!("gistmirror v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
