// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Check command - validate a config document

use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};

use super::{read_document, OutputFormat};
use crate::pipeline::{Config, PipelineValidator, ValidationReport};
use crate::utils::{print_diagnostic, print_section, print_success};

/// Run the check command
pub async fn run(file: PathBuf, format: OutputFormat, verbose: bool) -> Result<()> {
    let yaml = read_document(&file)?;
    let report = PipelineValidator::validate_document(&yaml);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("Failed to encode report: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{} {}", "Checking".bold(), file.display());
            print_report(&report);
            if verbose {
                print_summary(&yaml);
            }
            println!();
        }
    }

    finish(&file, &report, format)
}

/// Print every diagnostic, errors first
pub(crate) fn print_report(report: &ValidationReport) {
    if report.diagnostics.is_empty() {
        print_success("No problems found");
        return;
    }

    let errors: Vec<_> = report.errors().collect();
    if !errors.is_empty() {
        print_section(&"Errors".red().bold().to_string());
        errors.into_iter().for_each(print_diagnostic);
    }

    let notes: Vec<_> = report.diagnostics.iter().filter(|d| !d.is_error()).collect();
    if !notes.is_empty() {
        print_section(&"Warnings".yellow().bold().to_string());
        notes.into_iter().for_each(print_diagnostic);
    }
}

fn print_summary(yaml: &str) {
    let Ok(config) = Config::parse(yaml) else {
        return;
    };
    let Ok(stages) = config.ordered_stages() else {
        return;
    };

    print_section("Pipeline summary");
    println!("  Language: {}", config.settings.lang);
    println!("  Stages: {}", stages.len());
    for (key, stage) in stages {
        println!("    - {} {}", key, format!("({})", stage.kind).dimmed());
    }
}

fn finish(file: &Path, report: &ValidationReport, format: OutputFormat) -> Result<()> {
    let errors = report.errors().count();
    if errors > 0 {
        return Err(miette::miette!(
            "{} has {} error(s)",
            file.display(),
            errors
        ));
    }

    if format == OutputFormat::Text {
        if report.warnings().count() > 0 {
            println!("{}", "Config is valid but has warnings.".yellow().bold());
        } else {
            println!("{}", "Config is valid!".green().bold());
        }
    }
    Ok(())
}
