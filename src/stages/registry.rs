// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Stage registry
//!
//! Static catalog of the stage types the builder knows how to edit.

use serde_yaml::Value;

use super::{
    decode, Compile, DiffWithSkeleton, FileStructureValidation, GTest, Make, PyTest, Score,
    ShellExec, StageConfig, StageKind, StdioTest, Valgrind,
};

/// Catalog entry for one stage type
#[derive(Debug)]
pub struct StageType {
    /// Type name, PascalCase
    pub name: &'static str,
    /// Name shown in the palette and on canvas nodes
    pub display: &'static str,
    pub kind: StageKind,
    pub description: &'static str,
    default_config: fn() -> StageConfig,
    decode: fn(Value) -> Result<StageConfig, serde_yaml::Error>,
}

impl StageType {
    /// Configuration of a newly dropped stage
    pub fn default_config(&self) -> StageConfig {
        (self.default_config)()
    }

    /// Normalize a raw config block of this type
    pub fn from_raw(&self, raw: Value) -> Result<StageConfig, serde_yaml::Error> {
        (self.decode)(raw)
    }
}

/// All supported stage types
pub static STAGE_TYPES: &[StageType] = &[
    StageType {
        name: "DiffWithSkeleton",
        display: "Diff With Skeleton",
        kind: StageKind::PreGlobal,
        description: "Compare the submission against the skeleton files",
        default_config: || StageConfig::DiffWithSkeleton(DiffWithSkeleton::default()),
        decode: |v| decode(v).map(StageConfig::DiffWithSkeleton),
    },
    StageType {
        name: "FileStructureValidation",
        display: "File Structure Validation",
        kind: StageKind::PreGlobal,
        description: "Check that the submission contains the expected files",
        default_config: || StageConfig::FileStructureValidation(FileStructureValidation::default()),
        decode: |v| decode(v).map(StageConfig::FileStructureValidation),
    },
    StageType {
        name: "Compile",
        display: "Compile",
        kind: StageKind::PreLocal,
        description: "Compile the submission",
        default_config: || StageConfig::Compile(Compile::default()),
        decode: |v| decode(v).map(StageConfig::Compile),
    },
    StageType {
        name: "Make",
        display: "Make",
        kind: StageKind::PreLocal,
        description: "Build the submission with make",
        default_config: || StageConfig::Make(Make::default()),
        decode: |v| decode(v).map(StageConfig::Make),
    },
    StageType {
        name: "ShellExec",
        display: "Shell Command",
        kind: StageKind::PreLocal,
        description: "Run a shell command in the sandbox",
        default_config: || StageConfig::ShellExec(ShellExec::default()),
        decode: |v| decode(v).map(StageConfig::ShellExec),
    },
    StageType {
        name: "StdioTest",
        display: "Standard I/O Test",
        kind: StageKind::Grading,
        description: "Feed stdin and compare stdout against expected output",
        default_config: || StageConfig::StdioTest(StdioTest::default()),
        decode: |v| decode(v).map(StageConfig::StdioTest),
    },
    StageType {
        name: "Valgrind",
        display: "Valgrind",
        kind: StageKind::Grading,
        description: "Check test runs for memory errors",
        default_config: || StageConfig::Valgrind(Valgrind::default()),
        decode: |v| decode(v).map(StageConfig::Valgrind),
    },
    StageType {
        name: "GTest",
        display: "GoogleTest",
        kind: StageKind::Grading,
        description: "Grade a GoogleTest report",
        default_config: || StageConfig::GTest(GTest::default()),
        decode: |v| decode(v).map(StageConfig::GTest),
    },
    StageType {
        name: "PyTest",
        display: "pytest",
        kind: StageKind::Grading,
        description: "Grade a pytest report",
        default_config: || StageConfig::PyTest(PyTest::default()),
        decode: |v| decode(v).map(StageConfig::PyTest),
    },
    StageType {
        name: "Score",
        display: "Score",
        kind: StageKind::Post,
        description: "Normalize and clamp the final score",
        default_config: || StageConfig::Score(Score::default()),
        decode: |v| decode(v).map(StageConfig::Score),
    },
];

/// Find a stage type by its PascalCase name
pub fn lookup(name: &str) -> Option<&'static StageType> {
    STAGE_TYPES.iter().find(|t| t.name == name)
}

/// Stage types grouped by kind, in palette order; empty groups are skipped
pub fn palette() -> Vec<(StageKind, Vec<&'static StageType>)> {
    StageKind::ALL
        .iter()
        .map(|kind| {
            let types = STAGE_TYPES.iter().filter(|t| t.kind == *kind).collect::<Vec<_>>();
            (*kind, types)
        })
        .filter(|(_, types)| !types.is_empty())
        .collect()
}
