//! Lookout CLI - keeps a live listing of a working directory
//!
//! Reference host for `lookout-watcher`: it scans the directory, hands the
//! file list to the watcher, and rescans whenever the watcher asks.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod host;
mod scan;

#[derive(Parser)]
#[command(name = "lookout")]
#[command(author = "Lookout Contributors")]
#[command(version)]
#[command(about = "Watch a working directory and refresh its file list on change", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to .lookout/config.json
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Watch a directory and print the file list whenever it changes
    Watch {
        /// Directory to watch (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Override the configured cap on watched files
        #[arg(short, long)]
        max_watched_files: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Watch {
            path,
            max_watched_files,
        } => commands::watch(&path, max_watched_files).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
