// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Document validation collaborator

use async_trait::async_trait;

use crate::errors::BuilderResult;
use crate::pipeline::{PipelineValidator, ValidationReport};

/// Checks a serialized document before it is stored
///
/// The grading service implements this remotely; [`LocalValidator`] runs
/// the offline checks.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, yaml: &str, config_id: Option<u64>) -> BuilderResult<ValidationReport>;
}

/// Validator backed by [`PipelineValidator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalValidator;

#[async_trait]
impl Validator for LocalValidator {
    async fn validate(&self, yaml: &str, config_id: Option<u64>) -> BuilderResult<ValidationReport> {
        tracing::debug!(?config_id, "Validating document locally");
        Ok(PipelineValidator::validate_document(yaml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_validator() {
        let report = tokio_test::block_on(LocalValidator.validate("compile:\n  input: []\n", None))
            .unwrap();
        assert!(!report.is_success());

        let report = tokio_test::block_on(LocalValidator.validate("score:\n", Some(3))).unwrap();
        assert!(report.is_success());
    }
}
