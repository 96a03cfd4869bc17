// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Init command - create a starter config document

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::report;
use crate::editor::{GraphEditor, Position};
use crate::errors::{BuilderError, BuilderResult};
use crate::pipeline::Config;
use crate::settings::Lang;
use crate::stages::{lookup, StageConfig, StdioTestCase};
use crate::utils::print_success;

/// Stage types of the starter pipeline, in order
const STARTER_STAGES: &[&str] = &["DiffWithSkeleton", "Compile", "StdioTest", "Score"];

/// Run the init command
pub async fn run(file: PathBuf, lang: Option<String>, force: bool, verbose: bool) -> Result<()> {
    println!("{}", "Initializing assignment config...".bold());
    println!();

    if file.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite it.",
            file.display()
        ));
    }

    let config = starter_config(lang.as_deref()).map_err(report)?;
    let yaml = config.serialize().map_err(report)?;

    std::fs::write(&file, &yaml)
        .map_err(|e| miette::miette!("Failed to write {}: {}", file.display(), e))?;
    print_success(&format!("Created {}", file.display()));

    println!();
    println!("Next steps:");
    println!("  1. Fill in the test cases of the {} stage", "stdioTest".cyan());
    println!("  2. Run {} to validate the document", "gradeflow check".cyan());
    println!("  3. Run {} to store it", "gradeflow save".cyan());
    println!();

    if verbose {
        println!("{}", "Generated config:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", yaml.dimmed());
    }

    Ok(())
}

/// Skeleton diff, compile, one standard I/O test and score, chained in order
pub fn starter_config(lang: Option<&str>) -> BuilderResult<Config> {
    let mut config = Config::default();
    if let Some(lang) = lang {
        config.settings.lang = Lang::parse(lang);
    }

    let mut editor = GraphEditor::new(config);
    let mut parent = None;

    for name in STARTER_STAGES {
        let stage_type = lookup(name).ok_or_else(|| BuilderError::UnknownStageType {
            name: name.to_string(),
        })?;
        let id = editor
            .insert_stage(stage_type, Position::default(), parent)
            .ok_or_else(|| BuilderError::malformed("starter stage could not be inserted"))?;

        if let Some(StageConfig::StdioTest(mut stdio)) = editor.stage(id).map(|s| s.config.clone()) {
            let mut case = StdioTestCase::new(1);
            case.file = "a.out".to_string();
            stdio.test_cases.push(case);
            editor.update_config(id, StageConfig::StdioTest(stdio))?;
        }

        parent = Some(id);
    }

    Ok(editor.into_config())
}
