// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Stages that build the submission or run arbitrary commands

use serde::{Deserialize, Serialize};

use super::normalize::{
    args_or_none, clean_list, join_args, list_or_empty, list_or_none, text_or_empty, text_or_none,
};
use super::StageShape;

/// Raw `compile` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileRaw {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub flags: Option<Vec<String>>,
    #[serde(default)]
    pub additional_packages: Option<Vec<String>>,
}

/// Compiles the submission with the language's compiler
#[derive(Debug, Clone, PartialEq)]
pub struct Compile {
    /// Source globs
    pub input: Vec<String>,
    /// Output binary name
    pub output: String,
    /// Compiler flags as typed by the instructor
    pub flags: String,
    pub additional_packages: Vec<String>,
}

impl Default for Compile {
    fn default() -> Self {
        Self {
            input: vec!["*.cpp".to_string()],
            output: "a.out".to_string(),
            flags: String::new(),
            additional_packages: Vec::new(),
        }
    }
}

impl StageShape for Compile {
    type Raw = CompileRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            input: raw.input,
            output: text_or_empty(raw.output),
            flags: join_args(&list_or_empty(raw.flags)),
            additional_packages: list_or_empty(raw.additional_packages),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        CompileRaw {
            input: clean_list(&self.input),
            output: text_or_none(&self.output),
            flags: args_or_none(&self.flags),
            additional_packages: list_or_none(&self.additional_packages),
        }
    }
}

/// Raw `make` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MakeRaw {
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub additional_packages: Option<Vec<String>>,
}

/// Builds the submission through its Makefile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Make {
    pub targets: Vec<String>,
    pub args: String,
    pub additional_packages: Vec<String>,
}

impl StageShape for Make {
    type Raw = MakeRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            targets: list_or_empty(raw.targets),
            args: join_args(&list_or_empty(raw.args)),
            additional_packages: list_or_empty(raw.additional_packages),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        MakeRaw {
            targets: list_or_none(&self.targets),
            args: args_or_none(&self.args),
            additional_packages: list_or_none(&self.additional_packages),
        }
    }
}

/// Raw `shellExec` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellExecRaw {
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub additional_packages: Option<Vec<String>>,
}

/// Runs a shell command inside the grading sandbox
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellExec {
    pub cmd: String,
    pub additional_packages: Vec<String>,
}

impl StageShape for ShellExec {
    type Raw = ShellExecRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            cmd: raw.cmd,
            additional_packages: list_or_empty(raw.additional_packages),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        ShellExecRaw {
            cmd: self.cmd.trim().to_string(),
            additional_packages: list_or_none(&self.additional_packages),
        }
    }
}
