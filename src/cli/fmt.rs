// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Fmt command - rewrite a document in canonical form

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{read_document, report};
use crate::pipeline::Config;
use crate::utils::print_success;

/// Run the fmt command
pub async fn run(file: PathBuf, check: bool, verbose: bool) -> Result<()> {
    let original = read_document(&file)?;
    let formatted = canonical(&original).map_err(report)?;

    if formatted == original {
        print_success(&format!("{} is already formatted", file.display()));
        return Ok(());
    }

    if check {
        if verbose {
            println!("{}", "Canonical form:".dimmed());
            println!("{}", formatted.dimmed());
        }
        return Err(miette::miette!(
            "{} is not in canonical form\n\nRun 'gradeflow fmt {}' to rewrite it.",
            file.display(),
            file.display()
        ));
    }

    std::fs::write(&file, &formatted)
        .map_err(|e| miette::miette!("Failed to write {}: {}", file.display(), e))?;
    print_success(&format!("Formatted {}", file.display()));
    Ok(())
}

/// Parse and re-serialize a document
pub fn canonical(yaml: &str) -> crate::errors::BuilderResult<String> {
    Config::parse(yaml)?.serialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_is_stable() {
        let once = canonical("compile:\n  input: ['*.cpp']\n  flags: [-O2]\nscore:\n").unwrap();
        assert!(once.starts_with("_settings:"));
        assert_eq!(canonical(&once).unwrap(), once);
    }
}
