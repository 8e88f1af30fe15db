//! SoundSync CLI - profile seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Load tracks and carousel slides into a profile
//! ss-cli --data-dir ./profile seed --file catalog.yaml
//!
//! # Replace the catalog instead of appending
//! ss-cli seed --file catalog.yaml --replace
//!
//! # Grant or revoke admin console access
//! ss-cli admin create -e admin@example.com -r superadmin
//! ss-cli admin deactivate -e admin@example.com
//!
//! # List stored keys
//! ss-cli store keys
//! ```
//!
//! # Commands
//!
//! - `seed` - Seed catalog and carousel from YAML
//! - `admin create` / `admin deactivate` - Manage the admin roster
//! - `store keys` - Inspect a profile

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "SoundSync CLI tools")]
struct Cli {
    /// Profile directory (defaults to `SOUNDSYNC_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed catalog and carousel from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: String,

        /// Drop existing tracks and slides first
        #[arg(long)]
        replace: bool,
    },
    /// Manage the admin roster
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect the profile store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Add or replace an active roster entry
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Role (`superadmin`, `admin`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// Deactivate a roster entry
    Deactivate {
        /// Admin email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// List stored keys
    Keys,
}

/// Log filter when `RUST_LOG` is unset. Command results are logged at info.
const DEFAULT_LOG_FILTER: &str = "ss_cli=info,soundsync_storefront=warn";

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let storage = commands::open_profile(cli.data_dir)?;
    match cli.command {
        Commands::Seed { file, replace } => {
            commands::seed::from_file(&storage, &file, replace).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create { email, role } => {
                commands::admin::create(&storage, &email, &role)?;
            }
            AdminAction::Deactivate { email } => {
                commands::admin::deactivate(&storage, &email)?;
            }
        },
        Commands::Store { action } => match action {
            StoreAction::Keys => {
                commands::store::keys(&storage)?;
            }
        },
    }
    Ok(())
}
