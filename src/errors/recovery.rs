// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest reconnecting a pipeline that is no longer a single chain
    pub fn fix_malformed_graph(reason: &str) -> Self {
        Self {
            action: "Reconnect the pipeline into a single chain".into(),
            steps: vec![
                format!("Problem: {}", reason),
                "Stages inserted without a parent or duplicated stay disconnected".into(),
                "Connect each of them to exactly one stage before saving".into(),
            ],
            commands: vec![
                "# Inspect the current wiring:".into(),
                "gradeflow graph <file>".into(),
                "".into(),
                "# Connect two stages from an edit script:".into(),
                "- action: connect".into(),
                "  source: compile".into(),
                "  target: stdioTest".into(),
            ],
        }
    }

    /// Suggest renaming a label that collides with another stage
    pub fn rename_duplicate_label(stage: &str, label: &str) -> Self {
        Self {
            action: format!("Choose a different label than '{}'", label),
            steps: vec![
                format!("Another {} stage already uses the label '{}'", stage, label),
                "Labels only need to be unique among stages of the same type".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing invalid YAML
    pub fn fix_yaml_syntax() -> Self {
        Self {
            action: "Fix YAML syntax error".into(),
            steps: vec![
                "Check for common YAML issues:".into(),
                "  • Incorrect indentation (use spaces, not tabs)".into(),
                "  • Missing colons after stage keys".into(),
                "  • Unquoted values starting with '*' or '-'".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest creating a config record before updating it
    pub fn create_config() -> Self {
        Self {
            action: "Create the config record first".into(),
            steps: vec!["Saving without --config-id stores a new record and prints its id".into()],
            commands: vec!["gradeflow save <file>".into()],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
