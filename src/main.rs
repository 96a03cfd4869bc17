// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! gradeflow - Grading pipeline builder
//!
//! Build, check and store grading pipeline configs for programming assignments.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradeflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradeflow=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { file, lang, force } => {
            gradeflow::cli::init::run(file, lang, force, cli.verbose).await
        }
        Commands::Check { file, format } => {
            gradeflow::cli::check::run(file, format, cli.verbose).await
        }
        Commands::Fmt { file, check } => gradeflow::cli::fmt::run(file, check, cli.verbose).await,
        Commands::Graph {
            file,
            format,
            palette,
        } => gradeflow::cli::graph::run(file, format, palette, cli.verbose).await,
        Commands::Edit {
            script,
            file,
            dry_run,
        } => gradeflow::cli::edit::run(script, file, dry_run, cli.verbose).await,
        Commands::Save {
            file,
            config_id,
            store,
        } => gradeflow::cli::save::run(file, config_id, store, cli.verbose).await,
        Commands::Watch { file, debounce } => {
            gradeflow::cli::watch::run(file, debounce, cli.verbose).await
        }
    }
}
