// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Terminal output helpers
//!
//! Consistent glyphs and colors across the CLI.

use colored::Colorize;

use crate::pipeline::{Diagnostic, Severity};

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// `stage/block` prefix of a located diagnostic
pub fn diagnostic_location(diagnostic: &Diagnostic) -> Option<String> {
    diagnostic.location.as_ref().map(|location| match &location.block {
        Some(block) => format!("{}/{}", location.stage, block),
        None => location.stage.clone(),
    })
}

/// Print one diagnostic with the glyph of its severity
pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let text = match diagnostic_location(diagnostic) {
        Some(location) => format!("[{}] {}", location.cyan(), diagnostic.message),
        None => diagnostic.message.clone(),
    };

    match diagnostic.severity {
        Severity::Error => print_error(&text),
        Severity::Warning => print_warning(&text),
        Severity::Info => print_info(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_location() {
        let general = Diagnostic::error("X", "boom");
        assert_eq!(diagnostic_location(&general), None);

        let located = Diagnostic::error("X", "boom").at("compile:all", Some("input"));
        assert_eq!(diagnostic_location(&located).as_deref(), Some("compile:all/input"));

        let stage_only = Diagnostic::warning("X", "boom").at("score", None);
        assert_eq!(diagnostic_location(&stage_only).as_deref(), Some("score"));
    }
}
