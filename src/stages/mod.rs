// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Stage definitions and types
//!
//! A stage is one step of a grading pipeline. Each supported stage type has a
//! raw shape (what the grading service reads from the YAML document) and a
//! tidy shape (what the editor panels work with). [`StageShape`] converts
//! between the two; [`StageConfig`] is the tagged union over all of them.

mod build;
mod checks;
pub mod normalize;
mod registry;
mod score;
mod stdio;
mod valgrind;
mod xunit;

pub use build::{Compile, CompileRaw, Make, MakeRaw, ShellExec, ShellExecRaw};
pub use checks::{
    DiffWithSkeleton, DiffWithSkeletonRaw, FileStructureValidation, FileStructureValidationRaw,
};
pub use registry::{lookup, palette, StageType, STAGE_TYPES};
pub use score::{Score, ScoreRaw};
pub use stdio::{InputMode, StdioTest, StdioTestCase, StdioTestCaseRaw, StdioTestRaw};
pub use valgrind::{Valgrind, ValgrindRaw};
pub use xunit::{
    GTest, GTestRaw, JoinPolicy, Predicate, PredicateOp, PyTest, PyTestRaw, ScoreOverride,
    ScoreOverrideRaw, ScoreWeighting, ScoreWeightingRaw,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::stage_key;

/// Unique identity of a stage within a config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(Uuid);

impl StageId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Coarse classification used to group stage types in the add-stage palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    PreGlobal,
    PreLocal,
    Grading,
    Post,
    Constant,
}

impl StageKind {
    /// All kinds in palette order
    pub const ALL: [StageKind; 5] = [
        Self::PreGlobal,
        Self::PreLocal,
        Self::Grading,
        Self::Post,
        Self::Constant,
    ];
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreGlobal => write!(f, "pre-global"),
            Self::PreLocal => write!(f, "pre-local"),
            Self::Grading => write!(f, "grading"),
            Self::Post => write!(f, "post"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

/// Who can see a grading result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    AlwaysVisible,
    AlwaysHidden,
    VisibleAfterGrading,
    VisibleAfterGradingIfFailed,
}

/// Conversion between the raw (wire) shape and the tidy (editor) shape
///
/// Both directions are total: missing optional fields fall back to defaults
/// instead of failing.
pub trait StageShape: Sized {
    /// Wire shape as written in the YAML document
    type Raw: Serialize + DeserializeOwned + Default;

    /// Normalize a parsed raw config into the editor shape
    fn from_raw(raw: Self::Raw) -> Self;

    /// Convert the editor shape back into the wire shape
    fn to_raw(&self) -> Self::Raw;
}

/// Per-stage-type configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StageConfig {
    DiffWithSkeleton(DiffWithSkeleton),
    FileStructureValidation(FileStructureValidation),
    Compile(Compile),
    Make(Make),
    ShellExec(ShellExec),
    StdioTest(StdioTest),
    Valgrind(Valgrind),
    GTest(GTest),
    PyTest(PyTest),
    Score(Score),
    /// Stage type without a registry entry; holds the raw block as YAML text
    Unsupported(String),
}

impl StageConfig {
    /// Registry name of the variant, `None` for unsupported stages
    pub fn type_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::DiffWithSkeleton(_) => "DiffWithSkeleton",
            Self::FileStructureValidation(_) => "FileStructureValidation",
            Self::Compile(_) => "Compile",
            Self::Make(_) => "Make",
            Self::ShellExec(_) => "ShellExec",
            Self::StdioTest(_) => "StdioTest",
            Self::Valgrind(_) => "Valgrind",
            Self::GTest(_) => "GTest",
            Self::PyTest(_) => "PyTest",
            Self::Score(_) => "Score",
            Self::Unsupported(_) => return None,
        };
        Some(name)
    }

    /// Whether the stage type has a registry entry
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Convert into the raw wire value
    ///
    /// Unsupported stages re-parse their embedded YAML text.
    pub fn to_raw_value(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        match self {
            Self::DiffWithSkeleton(c) => encode(c),
            Self::FileStructureValidation(c) => encode(c),
            Self::Compile(c) => encode(c),
            Self::Make(c) => encode(c),
            Self::ShellExec(c) => encode(c),
            Self::StdioTest(c) => encode(c),
            Self::Valgrind(c) => encode(c),
            Self::GTest(c) => encode(c),
            Self::PyTest(c) => encode(c),
            Self::Score(c) => encode(c),
            Self::Unsupported(text) => serde_yaml::from_str(text),
        }
    }
}

fn encode<T: StageShape>(tidy: &T) -> Result<serde_yaml::Value, serde_yaml::Error> {
    serde_yaml::to_value(tidy.to_raw())
}

/// Decode a raw value into a tidy config; `null` decodes as the empty raw shape
pub(crate) fn decode<T: StageShape>(value: serde_yaml::Value) -> Result<T, serde_yaml::Error> {
    let raw = if value.is_null() {
        T::Raw::default()
    } else {
        serde_yaml::from_value(value)?
    };
    Ok(T::from_raw(raw))
}

/// One configured pipeline step
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Stage type name, matches a registry entry when supported. Unsupported
    /// stages keep the type key exactly as written in the document.
    pub name: String,
    /// Disambiguates stages of the same type; may be empty
    pub label: String,
    /// Copied from the stage type at creation
    pub kind: StageKind,
    pub config: StageConfig,
}

impl Stage {
    /// Create a stage with the default configuration of its type
    pub fn new(stage_type: &StageType) -> Self {
        Self {
            name: stage_type.name.to_string(),
            label: String::new(),
            kind: stage_type.kind,
            config: stage_type.default_config(),
        }
    }

    /// Create a stage for a type the registry does not know
    pub fn unsupported(name: impl Into<String>, label: impl Into<String>, yaml: String) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: StageKind::Constant,
            config: StageConfig::Unsupported(yaml),
        }
    }

    /// Key used for this stage in the YAML document
    pub fn key(&self) -> String {
        if self.config.is_supported() {
            stage_key(&self.name, &self.label)
        } else if self.label.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.name, self.label)
        }
    }

    /// Label shown on the canvas node
    pub fn display_label(&self) -> String {
        let display = lookup(&self.name).map_or(self.name.as_str(), |t| t.display);
        let mut text = if self.label.is_empty() {
            display.to_string()
        } else {
            format!("{} ({})", display, self.label)
        };
        if !self.config.is_supported() {
            text.push_str(" [unsupported]");
        }
        text
    }
}
