// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ludex - a cross-platform game library synchronizer.
//!
//! This is the binary entry point for the Ludex CLI.

mod app;
mod compare;
mod link;
mod status;
mod sync;

use clap::{Parser, Subcommand};

use ludex_core::Platform;

/// Ludex - sync Steam, PlayStation, Xbox, and Epic libraries into one place.
#[derive(Parser, Debug)]
#[command(name = "ludex", version, about, long_about = None)]
struct Cli {
    /// Acting user id. Defaults to `general.user_id` from the config.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Link a platform account.
    ///
    /// The material varies by platform: a 64-bit Steam id, a PSN NPSSO
    /// token, an Xbox gateway API key, or an Epic authorization code.
    Link { platform: Platform, material: String },
    /// Remove a linked platform account.
    Unlink { platform: Platform },
    /// Sync one platform's library, or all linked platforms.
    Sync {
        #[arg(required_unless_present = "all")]
        platform: Option<Platform>,
        /// Sync every platform with a linked credential.
        #[arg(long, conflicts_with = "platform")]
        all: bool,
    },
    /// Compare achievement progress for one title against a friend.
    Compare {
        platform: Platform,
        /// Friend's gamertag / online id / display name to search for.
        friend: String,
        title: String,
        /// Output the report as JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Show linked platforms, library sizes, and last sync times.
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ludex_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("ludex: config error: {error}");
            }
            std::process::exit(1);
        }
    };
    init_tracing(&config.general.log_level);

    let user = cli
        .user
        .unwrap_or_else(|| config.general.user_id.clone());

    if let Err(e) = run(cli.command, config, &user).await {
        eprintln!("ludex: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: ludex_config::LudexConfig,
    user: &str,
) -> Result<(), ludex_core::LudexError> {
    let app = app::App::build(config).await?;
    match command {
        Commands::Link { platform, material } => {
            link::run_link(&app, user, platform, &material).await
        }
        Commands::Unlink { platform } => link::run_unlink(&app, user, platform).await,
        Commands::Sync { platform, all } => sync::run_sync(&app, user, platform, all).await,
        Commands::Compare {
            platform,
            friend,
            title,
            json,
        } => compare::run_compare(&app, user, platform, &friend, &title, json).await,
        Commands::Status { json } => status::run_status(&app, user, json).await,
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ludex={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
