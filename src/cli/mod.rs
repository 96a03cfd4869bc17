// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for gradeflow.

pub mod check;
pub mod edit;
pub mod fmt;
pub mod graph;
pub mod init;
pub mod save;
pub mod watch;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::errors::BuilderError;
use crate::pipeline::Config;

/// Document used when no file is given
pub const DEFAULT_FILE: &str = "assignment.yaml";

/// Grading pipeline builder
///
/// Edit, check and store assignment grading configs.
#[derive(Parser, Debug)]
#[clap(
    name = "gradeflow",
    version,
    about = "Build and check grading pipeline configs for programming assignments",
    long_about = None,
    after_help = "Examples:\n\
        gradeflow init                      Create assignment.yaml\n\
        gradeflow check                     Validate the document\n\
        gradeflow graph --format dot        Print the stage graph\n\
        gradeflow edit changes.yaml         Apply editor actions\n\
        gradeflow save --config-id 3        Store the document\n\n\
        See 'gradeflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter config document
    Init {
        /// Document to create
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Language, e.g. cpp/g++:8 or python:3.10
        #[clap(short, long)]
        lang: Option<String>,

        /// Overwrite an existing document
        #[clap(long)]
        force: bool,
    },

    /// Validate a config document
    Check {
        /// Document to check
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rewrite a document in canonical form
    Fmt {
        /// Document to format
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Fail instead of writing when the document is not canonical
        #[clap(long)]
        check: bool,
    },

    /// Show the stage graph
    Graph {
        /// Document to show
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value = "text")]
        format: GraphFormat,

        /// List the available stage types instead
        #[clap(long)]
        palette: bool,
    },

    /// Apply a script of editor actions
    Edit {
        /// YAML or JSON list of actions
        script: PathBuf,

        /// Document to edit
        #[clap(short, long, default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Print the result instead of writing it
        #[clap(long)]
        dry_run: bool,
    },

    /// Validate and store a document
    Save {
        /// Document to store
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Existing record to update
        #[clap(long)]
        config_id: Option<u64>,

        /// Store directory
        #[clap(long, env = "GRADEFLOW_STORE", value_name = "DIR")]
        store: Option<PathBuf>,
    },

    /// Watch mode - re-check the document on changes
    Watch {
        /// Document to watch
        #[clap(default_value = DEFAULT_FILE)]
        file: PathBuf,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "500")]
        debounce: u64,
    },
}

/// Output format for the check command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
    Layout,
}

/// Read a document, pointing at `init` when it is missing
pub(crate) fn read_document(path: &Path) -> miette::Result<String> {
    if !path.exists() {
        return Err(miette::miette!(
            "Config document not found: {}\n\n\
             Run 'gradeflow init' to create one.",
            path.display()
        ));
    }

    std::fs::read_to_string(path).map_err(|e| {
        BuilderError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
        .into()
    })
}

/// Read and parse a document
pub(crate) fn load_config(path: &Path) -> miette::Result<Config> {
    let yaml = read_document(path)?;
    Config::parse(&yaml).map_err(report)
}

/// Turn a library error into a report, printing its remediation hint first
pub(crate) fn report(error: BuilderError) -> miette::Report {
    if let Some(suggestion) = error.suggestion() {
        eprintln!("{}", suggestion);
    }
    miette::Report::new(error)
}
