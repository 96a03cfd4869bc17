// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Memory checking pass

use serde::{Deserialize, Serialize};

use super::normalize::{
    args_or_none, clean_list, join_args, list_or_empty, number_to_text, text_to_number,
};
use super::{StageShape, Visibility};

/// Raw `valgrind` block, also used as the per-test-case override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValgrindRaw {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default, rename = "checksFilter")]
    pub checks_filter: Option<Vec<String>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Runs test cases under valgrind and grades memory errors
#[derive(Debug, Clone, PartialEq)]
pub struct Valgrind {
    pub enabled: bool,
    pub args: String,
    /// Error kinds that count, `*` for all. Empty counts none, so it is
    /// written as `[]` rather than `null`.
    pub checks_filter: Vec<String>,
    pub visibility: Visibility,
    pub score: String,
}

impl Default for Valgrind {
    fn default() -> Self {
        Self {
            enabled: true,
            args: String::new(),
            checks_filter: vec!["*".to_string()],
            visibility: Visibility::default(),
            score: String::new(),
        }
    }
}

impl StageShape for Valgrind {
    type Raw = ValgrindRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        let defaults = Self::default();
        Self {
            enabled: raw.enabled.unwrap_or(defaults.enabled),
            args: join_args(&list_or_empty(raw.args)),
            checks_filter: raw
                .checks_filter
                .map(|filter| clean_list(&filter))
                .unwrap_or(defaults.checks_filter),
            visibility: raw.visibility.unwrap_or(defaults.visibility),
            score: number_to_text(raw.score),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        ValgrindRaw {
            enabled: Some(self.enabled),
            args: args_or_none(&self.args),
            checks_filter: Some(clean_list(&self.checks_filter)),
            visibility: Some(self.visibility),
            score: text_to_number(&self.score),
        }
    }
}
