// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Save command - validate and store a document

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{load_config, report};
use crate::pipeline::Config;
use crate::session::{
    default_store_dir, BuilderSession, ConfigStore, FilesystemStore, LocalValidator, SaveOutcome,
};
use crate::utils::{create_spinner, print_diagnostic, print_success};

/// Run the save command
pub async fn run(
    file: PathBuf,
    config_id: Option<u64>,
    store_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let current = load_config(&file)?;

    let dir = store_dir.or_else(default_store_dir).ok_or_else(|| {
        miette::miette!("Could not determine a store directory. Pass --store or set GRADEFLOW_STORE.")
    })?;
    let store = FilesystemStore::new(dir).map_err(report)?;

    if verbose {
        println!("{} {}", "Store:".dimmed(), store.dir().display());
    }

    let initial = match config_id {
        Some(id) => {
            let stored = store.fetch(id).await.map_err(report)?;
            Config::parse(&stored).map_err(report)?
        }
        None => current.clone(),
    };

    let mut session = BuilderSession::resume(initial, current, config_id);
    let Some(request) = session.begin_save().map_err(report)? else {
        return Ok(());
    };

    let spinner = create_spinner("Saving config...");
    let outcome = request.submit(&LocalValidator, &store).await;
    spinner.finish_and_clear();
    session.finish_save(&outcome);

    match outcome {
        SaveOutcome::Saved { id, warnings, .. } => {
            warnings.iter().for_each(print_diagnostic);
            print_success(&format!("Saved {} as config {}", file.display(), id.to_string().cyan()));
            Ok(())
        }
        SaveOutcome::Unchanged => {
            print_success(&format!("Config {} is up to date", config_id.unwrap_or_default()));
            Ok(())
        }
        SaveOutcome::Rejected { diagnostics } => {
            diagnostics.iter().for_each(print_diagnostic);
            Err(miette::miette!(
                "Save rejected: {} error(s)",
                diagnostics.iter().filter(|d| d.is_error()).count()
            ))
        }
        SaveOutcome::Failed { error } => Err(report(error)),
    }
}
