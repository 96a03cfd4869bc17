// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Watch command - re-check the document on file changes

use colored::Colorize;
use miette::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use super::check::print_report;
use crate::pipeline::PipelineValidator;

/// Run the watch command
pub async fn run(file: PathBuf, debounce_ms: u64, verbose: bool) -> Result<()> {
    if !file.exists() {
        return Err(miette::miette!(
            "Config document not found: {}\n\n\
             Run 'gradeflow init' to create one.",
            file.display()
        ));
    }

    println!("{}", "Starting watch mode...".bold());
    println!("Watching {} (debounce: {}ms)", file.display(), debounce_ms);
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    // Editors often replace the file, so watch its directory
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| miette::miette!("Failed to start watching: {}", e))?;

    check_once(&file);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .any(|e| same_file(&e.path, &file));

                if relevant {
                    println!();
                    println!("{}", "─".repeat(50).dimmed());
                    println!("{}: {}", "Change detected".yellow(), file.display());
                    println!();
                    check_once(&file);
                } else if verbose {
                    tracing::debug!(events = events.len(), "Ignoring unrelated changes");
                }
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn same_file(changed: &Path, watched: &Path) -> bool {
    changed.file_name() == watched.file_name()
}

fn check_once(file: &Path) {
    let start = std::time::Instant::now();

    let yaml = match std::fs::read_to_string(file) {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("{}: {}", "Failed to read document".red(), e);
            return;
        }
    };

    let report = PipelineValidator::validate_document(&yaml);
    print_report(&report);

    let elapsed = start.elapsed();
    if report.is_success() {
        println!("{} ({:.2}s)", "Config is valid".green(), elapsed.as_secs_f64());
    } else {
        println!("{} ({:.2}s)", "Config has errors".red(), elapsed.as_secs_f64());
    }
}
