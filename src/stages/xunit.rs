// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Unit test framework stages and their weighted scoring policy
//!
//! A weighting assigns every test a default score, optionally capped, and
//! lets overrides pick tests by class, test or display name. Overrides get a
//! generated id so list editors can track rows; the id never reaches the
//! document and is regenerated on every parse.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::normalize::{
    args_or_none, join_args, list_or_empty, list_or_none, number_to_text, text_to_number,
};
use super::StageShape;

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOp {
    Eq,
    NotEq,
    Regex,
}

/// Matches one name field of a test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub op: PredicateOp,
    pub value: String,
}

/// How the predicates of one override combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinPolicy {
    #[default]
    And,
    Or,
}

/// Raw override entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreOverrideRaw {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "joinPolicy")]
    pub join_policy: Option<JoinPolicy>,
    #[serde(default, rename = "className")]
    pub class_name: Option<Predicate>,
    #[serde(default, rename = "testName")]
    pub test_name: Option<Predicate>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<Predicate>,
}

/// Editor shape of an override
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOverride {
    /// Row identity for list editing, never serialized
    pub id: Uuid,
    pub score: String,
    pub join_policy: JoinPolicy,
    pub class_name: Option<Predicate>,
    pub test_name: Option<Predicate>,
    pub display_name: Option<Predicate>,
}

impl ScoreOverride {
    /// Empty override with a fresh row id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            score: String::new(),
            join_policy: JoinPolicy::default(),
            class_name: None,
            test_name: None,
            display_name: None,
        }
    }

    fn from_raw(raw: ScoreOverrideRaw) -> Self {
        Self {
            id: Uuid::new_v4(),
            score: number_to_text(raw.score),
            join_policy: raw.join_policy.unwrap_or_default(),
            class_name: raw.class_name,
            test_name: raw.test_name,
            display_name: raw.display_name,
        }
    }

    fn to_raw(&self) -> ScoreOverrideRaw {
        ScoreOverrideRaw {
            score: text_to_number(&self.score),
            join_policy: Some(self.join_policy),
            class_name: self.class_name.clone(),
            test_name: self.test_name.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl Default for ScoreOverride {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw `scoreWeighting` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeightingRaw {
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub overrides: Vec<ScoreOverrideRaw>,
}

/// Editor shape of a weighting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreWeighting {
    pub default: String,
    pub limit: String,
    pub overrides: Vec<ScoreOverride>,
}

impl ScoreWeighting {
    fn from_raw(raw: ScoreWeightingRaw) -> Self {
        Self {
            default: number_to_text(raw.default),
            limit: number_to_text(raw.limit),
            overrides: raw.overrides.into_iter().map(ScoreOverride::from_raw).collect(),
        }
    }

    fn to_raw(&self) -> ScoreWeightingRaw {
        ScoreWeightingRaw {
            default: text_to_number(&self.default),
            limit: text_to_number(&self.limit),
            overrides: self.overrides.iter().map(ScoreOverride::to_raw).collect(),
        }
    }
}

/// Raw `gTest` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GTestRaw {
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "scoreWeighting")]
    pub score_weighting: Option<ScoreWeightingRaw>,
}

/// Runs a GoogleTest binary and grades its report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GTest {
    pub args: String,
    /// Uniform score per passing test, used when no weighting is set
    pub score: String,
    pub score_weighting: Option<ScoreWeighting>,
}

impl StageShape for GTest {
    type Raw = GTestRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            args: join_args(&list_or_empty(raw.args)),
            score: number_to_text(raw.score),
            score_weighting: raw.score_weighting.map(ScoreWeighting::from_raw),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        GTestRaw {
            args: args_or_none(&self.args),
            score: text_to_number(&self.score),
            score_weighting: self.score_weighting.as_ref().map(ScoreWeighting::to_raw),
        }
    }
}

/// Raw `pyTest` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PyTestRaw {
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub additional_pip_packages: Option<Vec<String>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "scoreWeighting")]
    pub score_weighting: Option<ScoreWeightingRaw>,
}

/// Runs pytest and grades its report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PyTest {
    pub args: String,
    pub additional_pip_packages: Vec<String>,
    pub score: String,
    pub score_weighting: Option<ScoreWeighting>,
}

impl StageShape for PyTest {
    type Raw = PyTestRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            args: join_args(&list_or_empty(raw.args)),
            additional_pip_packages: list_or_empty(raw.additional_pip_packages),
            score: number_to_text(raw.score),
            score_weighting: raw.score_weighting.map(ScoreWeighting::from_raw),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        PyTestRaw {
            args: args_or_none(&self.args),
            additional_pip_packages: list_or_none(&self.additional_pip_packages),
            score: text_to_number(&self.score),
            score_weighting: self.score_weighting.as_ref().map(ScoreWeighting::to_raw),
        }
    }
}
