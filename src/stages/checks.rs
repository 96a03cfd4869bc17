// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Submission checks that run before anything is built

use serde::{Deserialize, Serialize};

use super::normalize::{list_or_empty, list_or_none};
use super::StageShape;

/// Raw `diffWithSkeleton` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffWithSkeletonRaw {
    #[serde(default)]
    pub exclude_from_provided: Option<bool>,
}

/// Compares the submission against the skeleton files
#[derive(Debug, Clone, PartialEq)]
pub struct DiffWithSkeleton {
    /// Skip files that the instructor provides anyway
    pub exclude_from_provided: bool,
}

impl Default for DiffWithSkeleton {
    fn default() -> Self {
        Self {
            exclude_from_provided: true,
        }
    }
}

impl StageShape for DiffWithSkeleton {
    type Raw = DiffWithSkeletonRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            exclude_from_provided: raw.exclude_from_provided.unwrap_or(true),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        DiffWithSkeletonRaw {
            exclude_from_provided: Some(self.exclude_from_provided),
        }
    }
}

/// Raw `fileStructureValidation` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStructureValidationRaw {
    #[serde(default)]
    pub ignore_in_submission: Option<Vec<String>>,
}

/// Checks that the submission has the files the template expects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStructureValidation {
    /// Glob patterns ignored when comparing against the template
    pub ignore_in_submission: Vec<String>,
}

impl StageShape for FileStructureValidation {
    type Raw = FileStructureValidationRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            ignore_in_submission: list_or_empty(raw.ignore_in_submission),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        FileStructureValidationRaw {
            ignore_in_submission: list_or_none(&self.ignore_in_submission),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_with_skeleton_defaults_to_exclude() {
        let tidy = DiffWithSkeleton::from_raw(DiffWithSkeletonRaw::default());
        assert!(tidy.exclude_from_provided);

        let raw = DiffWithSkeletonRaw {
            exclude_from_provided: Some(false),
        };
        assert_eq!(DiffWithSkeleton::from_raw(raw.clone()).to_raw(), raw);
    }

    #[test]
    fn test_file_structure_absent_list_is_empty() {
        let tidy = FileStructureValidation::from_raw(FileStructureValidationRaw::default());
        assert!(tidy.ignore_in_submission.is_empty());
        assert_eq!(tidy.to_raw().ignore_in_submission, None);
    }

    #[test]
    fn test_file_structure_round_trip() {
        let raw = FileStructureValidationRaw {
            ignore_in_submission: Some(vec!["*.o".into(), ".DS_Store".into()]),
        };
        assert_eq!(FileStructureValidation::from_raw(raw.clone()).to_raw(), raw);
    }
}
