// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Final score normalization

use serde::{Deserialize, Serialize};

use super::normalize::{number_to_text, text_to_number};
use super::StageShape;

/// Raw `score` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRaw {
    #[serde(default, rename = "normalizedTo")]
    pub normalized_to: Option<f64>,
    #[serde(default, rename = "minScore")]
    pub min_score: Option<f64>,
    #[serde(default, rename = "maxScore")]
    pub max_score: Option<f64>,
}

/// Scales and clamps the accumulated score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub normalized_to: String,
    pub min_score: String,
    pub max_score: String,
}

impl StageShape for Score {
    type Raw = ScoreRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            normalized_to: number_to_text(raw.normalized_to),
            min_score: number_to_text(raw.min_score),
            max_score: number_to_text(raw.max_score),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        ScoreRaw {
            normalized_to: text_to_number(&self.normalized_to),
            min_score: text_to_number(&self.min_score),
            max_score: text_to_number(&self.max_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_strings() {
        let raw: ScoreRaw = serde_yaml::from_str("normalizedTo: 100\nminScore: 0\n").unwrap();
        let tidy = Score::from_raw(raw.clone());

        assert_eq!(tidy.normalized_to, "100");
        assert_eq!(tidy.min_score, "0");
        assert_eq!(tidy.max_score, "");
        assert_eq!(tidy.to_raw(), raw);
    }

    #[test]
    fn test_unparsable_text_is_absent() {
        let tidy = Score {
            normalized_to: "one hundred".into(),
            min_score: " 5 ".into(),
            max_score: String::new(),
        };
        let raw = tidy.to_raw();
        assert_eq!(raw.normalized_to, None);
        assert_eq!(raw.min_score, Some(5.0));

        let yaml = serde_yaml::to_string(&raw).unwrap();
        assert!(yaml.contains("normalizedTo: null"));
    }
}
