// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Pipeline model
//!
//! The stage dependency graph, the config document that carries it, stage
//! keys and labels, and local validation of documents.

mod document;
mod graph;
mod labels;
mod validation;

pub use document::{Config, SETTINGS_KEY};
pub use graph::{
    delete_node, execution_order, graph_equal, ordered_sequence, transpose, DependencyGraph,
};
pub use labels::{camel_case, generate_disambiguating_labels, random_label, stage_key, title_case};
pub use validation::{
    Diagnostic, DiagnosticLocation, PipelineValidator, Severity, ValidationReport,
};
