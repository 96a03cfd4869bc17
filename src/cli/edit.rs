// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Edit command - apply a script of editor actions
//!
//! Scripts are YAML (or JSON) lists. Stages are addressed by their document
//! key as it is at the time the action runs.
//!
//! ```yaml
//! - action: insert
//!   type: Valgrind
//!   after: stdioTest
//! - action: label
//!   stage: valgrind
//!   label: leaks
//! ```

use colored::Colorize;
use miette::Result;
use serde::Deserialize;
use std::path::PathBuf;

use super::{load_config, report};
use crate::editor::{edge_id, GraphEditor, Position};
use crate::errors::{BuilderError, BuilderResult};
use crate::stages::{lookup, StageId};
use crate::utils::print_success;

/// One scripted editor action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditAction {
    /// Insert a stage, spliced after `after` or left disconnected
    Insert {
        #[serde(rename = "type")]
        stage_type: String,
        #[serde(default)]
        after: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
    Delete {
        stage: String,
    },
    /// Make `target` depend on `source`
    Connect {
        source: String,
        target: String,
    },
    Disconnect {
        source: String,
        target: String,
    },
    Duplicate {
        stage: String,
    },
    Label {
        stage: String,
        label: String,
    },
}

/// Run the edit command
pub async fn run(script: PathBuf, file: PathBuf, dry_run: bool, verbose: bool) -> Result<()> {
    let text = std::fs::read_to_string(&script)
        .map_err(|e| miette::miette!("Failed to read script {}: {}", script.display(), e))?;
    let actions: Vec<EditAction> = serde_yaml::from_str(&text)
        .map_err(|e| miette::miette!("Invalid edit script {}: {}", script.display(), e))?;

    let mut editor = GraphEditor::new(load_config(&file)?);
    let log = apply_script(&mut editor, &actions).map_err(report)?;

    if verbose {
        for line in &log {
            println!("  {} {}", "→".blue(), line);
        }
    }

    let yaml = editor.config().serialize().map_err(report)?;

    if dry_run {
        print!("{}", yaml);
        return Ok(());
    }

    std::fs::write(&file, yaml)
        .map_err(|e| miette::miette!("Failed to write {}: {}", file.display(), e))?;
    print_success(&format!(
        "Applied {} action(s) to {}",
        actions.len(),
        file.display()
    ));
    Ok(())
}

/// Apply actions in order; the first failing action aborts the script
pub fn apply_script(editor: &mut GraphEditor, actions: &[EditAction]) -> BuilderResult<Vec<String>> {
    let mut log = Vec::with_capacity(actions.len());

    for action in actions {
        let line = match action {
            EditAction::Insert {
                stage_type,
                after,
                label,
            } => {
                let stage_type = lookup(stage_type).ok_or_else(|| BuilderError::UnknownStageType {
                    name: stage_type.clone(),
                })?;
                let parent = after.as_deref().map(|key| resolve(editor, key)).transpose()?;
                let id = editor
                    .insert_stage(stage_type, Position::default(), parent)
                    .ok_or_else(|| BuilderError::StageNotFound {
                        key: after.clone().unwrap_or_default(),
                    })?;
                if let Some(label) = label {
                    editor.set_label(id, label)?;
                }
                format!("inserted {}", key(editor, id))
            }
            EditAction::Delete { stage } => {
                let id = resolve(editor, stage)?;
                editor.delete_stage(id);
                format!("deleted {}", stage)
            }
            EditAction::Connect { source, target } => {
                let (s, t) = (resolve(editor, source)?, resolve(editor, target)?);
                if editor.connect(s, t) {
                    format!("connected {} -> {}", source, target)
                } else {
                    format!("left {} -> {} unchanged", source, target)
                }
            }
            EditAction::Disconnect { source, target } => {
                let (s, t) = (resolve(editor, source)?, resolve(editor, target)?);
                if editor.disconnect(&edge_id(s, t)) {
                    format!("disconnected {} -> {}", source, target)
                } else {
                    format!("no edge {} -> {}", source, target)
                }
            }
            EditAction::Duplicate { stage } => {
                let id = resolve(editor, stage)?;
                let copy = editor
                    .duplicate_stage(id)
                    .ok_or_else(|| BuilderError::StageNotFound { key: stage.clone() })?;
                format!("duplicated {} as {}", stage, key(editor, copy))
            }
            EditAction::Label { stage, label } => {
                let id = resolve(editor, stage)?;
                editor.set_label(id, label)?;
                format!("relabelled {} as {}", stage, key(editor, id))
            }
        };

        tracing::debug!("{}", line);
        log.push(line);
    }

    Ok(log)
}

fn resolve(editor: &GraphEditor, key: &str) -> BuilderResult<StageId> {
    editor
        .config()
        .find_by_key(key)
        .ok_or_else(|| BuilderError::StageNotFound { key: key.to_string() })
}

fn key(editor: &GraphEditor, id: StageId) -> String {
    editor.stage(id).map(|s| s.key()).unwrap_or_default()
}
