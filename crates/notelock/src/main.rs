// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notelock - a device-auth-gated single-note keeper.
//!
//! This is the binary entry point: it loads configuration, initializes
//! tracing, and drives a terminal session against the note controller.

mod session;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::session::Session;

/// Notelock - a device-auth-gated single-note keeper.
#[derive(Parser, Debug)]
#[command(name = "notelock", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the stored note.
    Show,
    /// Replace the stored note with the given content.
    Write {
        /// The new note content.
        content: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match notelock_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            notelock_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let code = match cli.command {
        Some(command) => match run(command, &config).await {
            Ok(()) => 0,
            Err(err) => {
                error!(error = %err, "command failed");
                eprintln!("notelock: {err}");
                1
            }
        },
        None => {
            println!("notelock: use --help for available commands");
            0
        }
    };

    std::process::exit(code);
}

async fn run(
    command: Commands,
    config: &notelock_config::NotelockConfig,
) -> Result<(), notelock_core::NotelockError> {
    let mut session = Session::open(config)?;

    match command {
        Commands::Show => {
            let note = session.load().await?;
            match note.content() {
                Some(content) => println!("{content}"),
                None => println!("(no note stored)"),
            }
        }
        Commands::Write { content } => {
            // Load first so the save updates the existing row instead of
            // inserting a second one.
            session.load().await?;
            let saved = session.save(content).await?;
            println!("saved note {}", saved.id());
        }
    }

    session.shutdown().await
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("notelock={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = notelock_config::load_and_validate()
            .expect("default config should be valid");
        assert_eq!(config.keystore.key_name, "notelock-passphrase");
    }
}
