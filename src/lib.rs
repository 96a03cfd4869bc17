// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! # gradeflow - Grading pipeline builder
//!
//! `gradeflow` models the grading pipeline of a programming assignment as a
//! chain of stages and converts it to and from the YAML config document the
//! grading service consumes.
//!
//! ## Features
//!
//! - **Stage registry** - Compile, Make, standard I/O tests, GoogleTest, pytest, Valgrind, Score
//! - **Lossless documents** - Parse, edit and serialize with per-stage normalization
//! - **Graph editing** - Insert, splice, delete, connect and duplicate stages with layout
//! - **Save flow** - Local validation, diagnostics routed to stages, pluggable storage
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a starter document
//! gradeflow init
//!
//! # Validate it
//! gradeflow check
//!
//! # Show the stage chain
//! gradeflow graph
//!
//! # Store it
//! gradeflow save
//! ```

pub mod cli;
pub mod editor;
pub mod errors;
pub mod pipeline;
pub mod session;
pub mod settings;
pub mod stages;
pub mod utils;

// Re-export commonly used types
pub use editor::GraphEditor;
pub use errors::{BuilderError, BuilderResult};
pub use pipeline::{Config, PipelineValidator};
pub use session::BuilderSession;
pub use stages::{Stage, StageId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
