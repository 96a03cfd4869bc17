// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Error types
//!
//! Pure graph and codec functions only fail on invariant violations that
//! would otherwise corrupt output silently. Stale ids and unsupported stages
//! are logged and treated as no-ops instead.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for gradeflow operations
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Main error type for gradeflow
#[derive(Error, Debug, Diagnostic)]
pub enum BuilderError {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid config document: {reason}")]
    #[diagnostic(code(gradeflow::invalid_document))]
    InvalidDocument {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Stage '{stage}' has an invalid configuration: {reason}")]
    #[diagnostic(
        code(gradeflow::invalid_stage),
        help("Compare the stage block against the fields its stage type accepts")
    )]
    InvalidStage { stage: String, reason: String },

    #[error("Stage dependency graph is not a single chain: {reason}")]
    #[diagnostic(
        code(gradeflow::malformed_graph),
        help("Every stage except the first must depend on exactly one other stage")
    )]
    MalformedGraph { reason: String },

    #[error("Label '{label}' is already used by another {stage} stage")]
    #[diagnostic(
        code(gradeflow::duplicate_label),
        help("Stages of the same type need distinct labels")
    )]
    DuplicateLabel { stage: String, label: String },

    #[error("Unknown stage type '{name}'")]
    #[diagnostic(
        code(gradeflow::unknown_stage_type),
        help("Run 'gradeflow graph --palette' to list the supported stage types")
    )]
    UnknownStageType { name: String },

    #[error("No stage with key '{key}'")]
    #[diagnostic(code(gradeflow::stage_not_found))]
    StageNotFound { key: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Config store error: {message}")]
    #[diagnostic(code(gradeflow::store_error))]
    Store { message: String },

    #[error("Config {id} does not exist")]
    #[diagnostic(
        code(gradeflow::config_not_found),
        help("Omit --config-id to create a new config record")
    )]
    ConfigNotFound { id: u64 },

    #[error("Validation service error: {message}")]
    #[diagnostic(code(gradeflow::validation_service))]
    ValidationService { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(gradeflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(gradeflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(gradeflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(gradeflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(gradeflow::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for BuilderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for BuilderError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for BuilderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl BuilderError {
    /// Create a malformed graph error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGraph { reason: reason.into() }
    }

    /// Create an invalid document error with a hint
    pub fn invalid_document(reason: impl Into<String>, help: Option<&str>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
            help: help.map(str::to_string),
        }
    }

    /// Remediation hint for errors the CLI knows how to explain
    pub fn suggestion(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::MalformedGraph { reason } => Some(RecoverySuggestion::fix_malformed_graph(reason)),
            Self::DuplicateLabel { stage, label } => {
                Some(RecoverySuggestion::rename_duplicate_label(stage, label))
            }
            Self::Yaml { .. } => Some(RecoverySuggestion::fix_yaml_syntax()),
            Self::ConfigNotFound { .. } => Some(RecoverySuggestion::create_config()),
            _ => None,
        }
    }
}
