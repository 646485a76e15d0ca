// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Icebreaker - a proactive conversation starter for chat groups.
//!
//! This is the binary entry point for the standalone Icebreaker runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Icebreaker - a proactive conversation starter for chat groups.
#[derive(Parser, Debug)]
#[command(name = "icebreaker", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file; the standard hierarchy is used when
    /// omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the scheduler loop.
    Serve {
        /// SQLite database path; defaults to the user data directory.
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print the resolved configuration and exit.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let raw = match cli.config.as_deref() {
        Some(path) => icebreaker_config::load_raw_from_path(path),
        None => icebreaker_config::load_raw(),
    };
    let raw = match raw {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("icebreaker: failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve { db }) => {
            if let Err(err) = serve::run_serve(raw, db).await {
                eprintln!("icebreaker serve: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            let settings = icebreaker_config::PluginSettings::resolve(&raw);
            println!("{settings:#?}");
        }
        None => {
            println!("icebreaker: use --help for available commands");
        }
    }
}
