// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Pipeline validation
//!
//! Checks a config document before it is saved. Findings are reported as
//! [`Diagnostic`] records shaped like the ones the grading service returns,
//! so both can be routed to stage panels the same way.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::document::{Config, SETTINGS_KEY};
use crate::errors::BuilderError;
use crate::stages::normalize::text_to_number;
use crate::stages::{InputMode, Predicate, PredicateOp, ScoreWeighting, StageConfig};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Where in the document a finding applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticLocation {
    /// Stage key, or `_settings`
    pub stage: String,
    /// Field within the stage
    #[serde(default)]
    pub block: Option<String>,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub error_type: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub location: Option<DiagnosticLocation>,
}

impl Diagnostic {
    pub fn error(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.to_string(),
            message: message.into(),
            severity: Severity::Error,
            location: None,
        }
    }

    pub fn warning(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(error_type, message)
        }
    }

    /// Attach a location
    pub fn at(mut self, stage: impl Into<String>, block: Option<&str>) -> Self {
        self.location = Some(DiagnosticLocation {
            stage: stage.into(),
            block: block.map(str::to_string),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Result of validating a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// True when nothing blocks a save
    pub fn is_success(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}

/// Local config validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Parse and validate document text
    pub fn validate_document(yaml: &str) -> ValidationReport {
        match Config::parse(yaml) {
            Ok(config) => Self::validate(&config),
            Err(e) => {
                let mut report = ValidationReport::new();
                report.push(Self::parse_diagnostic(&e));
                report
            }
        }
    }

    /// Validate a parsed config
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        if config.settings.lang.language.trim().is_empty() {
            report.push(
                Diagnostic::error("INVALID_SETTINGS", "Language must not be empty")
                    .at(SETTINGS_KEY, Some("lang")),
            );
        }

        let stages = match config.ordered_stages() {
            Ok(stages) => stages,
            Err(e) => {
                report.push(Diagnostic::error("MALFORMED_GRAPH", e.to_string()));
                return report;
            }
        };

        for (key, stage) in &stages {
            match &stage.config {
                StageConfig::Unsupported(_) => {
                    report.push(
                        Diagnostic::warning(
                            "UNSUPPORTED_STAGE",
                            format!(
                                "Stage type '{}' cannot be edited and is kept as written",
                                stage.name
                            ),
                        )
                        .at(key.as_str(), None),
                    );
                }
                StageConfig::Compile(compile) => {
                    Self::check_patterns(key, &compile.input, &mut report);
                }
                StageConfig::ShellExec(shell) if shell.cmd.trim().is_empty() => {
                    report.push(
                        Diagnostic::error("INVALID_STAGE", "Shell command is empty")
                            .at(key.as_str(), Some("cmd")),
                    );
                }
                StageConfig::StdioTest(stdio) => {
                    Self::check_test_cases(key, stdio, &mut report);
                }
                StageConfig::GTest(gtest) => {
                    Self::check_weighting(key, gtest.score_weighting.as_ref(), &mut report);
                }
                StageConfig::PyTest(pytest) => {
                    Self::check_weighting(key, pytest.score_weighting.as_ref(), &mut report);
                }
                StageConfig::Score(score) => {
                    let min = text_to_number(&score.min_score);
                    let max = text_to_number(&score.max_score);
                    if let (Some(min), Some(max)) = (min, max) {
                        if min > max {
                            report.push(
                                Diagnostic::error(
                                    "INVALID_STAGE",
                                    format!("Minimum score {} is above maximum {}", min, max),
                                )
                                .at(key.as_str(), Some("minScore")),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            diagnostics = report.diagnostics.len(),
            success = report.is_success(),
            "Validated config"
        );
        report
    }

    fn parse_diagnostic(error: &BuilderError) -> Diagnostic {
        match error {
            BuilderError::InvalidStage { stage, reason } => {
                Diagnostic::error("INVALID_STAGE", reason.clone()).at(stage.as_str(), None)
            }
            BuilderError::MalformedGraph { .. } => {
                Diagnostic::error("MALFORMED_GRAPH", error.to_string())
            }
            other => Diagnostic::error("INVALID_DOCUMENT", other.to_string()),
        }
    }

    fn check_patterns(key: &str, patterns: &[String], report: &mut ValidationReport) {
        if patterns.is_empty() {
            report.push(
                Diagnostic::error("INVALID_STAGE", "No input files to compile")
                    .at(key, Some("input")),
            );
        }

        for pattern in patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                report.push(
                    Diagnostic::error(
                        "INVALID_STAGE",
                        format!("Input pattern '{}' is not a valid glob: {}", pattern, e),
                    )
                    .at(key, Some("input")),
                );
            }
        }
    }

    fn check_test_cases(
        key: &str,
        stdio: &crate::stages::StdioTest,
        report: &mut ValidationReport,
    ) {
        if stdio.test_cases.is_empty() {
            report.push(
                Diagnostic::warning("EMPTY_STAGE", "Stage has no test cases")
                    .at(key, Some("testCases")),
            );
            return;
        }

        let mut seen = HashSet::new();
        for case in &stdio.test_cases {
            if !seen.insert(case.id) {
                report.push(
                    Diagnostic::error("INVALID_STAGE", format!("Duplicate test case id {}", case.id))
                        .at(key, Some("testCases")),
                );
            }
            if case.expected_mode == InputMode::None {
                report.push(
                    Diagnostic::warning(
                        "MISSING_EXPECTED",
                        format!("Test case {} has no expected output", case.id),
                    )
                    .at(key, Some("testCases")),
                );
            }
        }
    }

    fn check_weighting(
        key: &str,
        weighting: Option<&ScoreWeighting>,
        report: &mut ValidationReport,
    ) {
        let Some(weighting) = weighting else {
            return;
        };

        let predicates = weighting.overrides.iter().flat_map(|o| {
            [&o.class_name, &o.test_name, &o.display_name]
                .into_iter()
                .flatten()
        });

        for Predicate { op, value } in predicates {
            if *op != PredicateOp::Regex {
                continue;
            }
            if let Err(e) = regex::Regex::new(value) {
                report.push(
                    Diagnostic::error(
                        "INVALID_STAGE",
                        format!("Override pattern '{}' is not a valid regex: {}", value, e),
                    )
                    .at(key, Some("scoreWeighting")),
                );
            }
        }
    }
}
