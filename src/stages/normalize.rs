// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Field-level conversions shared by the stage normalizers
//!
//! Editor panels render free-text arguments as one string and numbers as
//! text inputs; the YAML document stores token arrays and numbers.

/// Split free text into whitespace-separated tokens
pub fn split_args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Join tokens into one editable string
pub fn join_args(tokens: &[String]) -> String {
    tokens
        .iter()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize free text; blank text is absent
pub fn args_or_none(text: &str) -> Option<Vec<String>> {
    let tokens = split_args(text);
    (!tokens.is_empty()).then_some(tokens)
}

/// Absent lists become empty lists
pub fn list_or_empty(list: Option<Vec<String>>) -> Vec<String> {
    list.unwrap_or_default()
}

/// Trim entries and drop blanks; an empty result is absent
pub fn list_or_none(list: &[String]) -> Option<Vec<String>> {
    let cleaned = clean_list(list);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Trim entries and drop blanks
pub fn clean_list(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Absent text becomes the empty string
pub fn text_or_empty(text: Option<String>) -> String {
    text.unwrap_or_default()
}

/// Trimmed text; blank text is absent
pub fn text_or_none(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render a number for a text input
pub fn number_to_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse a text input back into a number; blank or unparsable text is absent
pub fn text_to_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render an integer for a text input
pub fn integer_to_text(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse a text input back into an integer
pub fn text_to_integer(text: &str) -> Option<u64> {
    text.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_round_trip() {
        let raw = vec!["-Wall".to_string(), "-Wextra".to_string()];
        let tidy = join_args(&raw);
        assert_eq!(tidy, "-Wall -Wextra");
        assert_eq!(args_or_none(&tidy), Some(raw));
    }

    #[test]
    fn test_args_discard_empty_tokens() {
        assert_eq!(split_args("  -O2 \t  -g\n"), vec!["-O2", "-g"]);
        assert_eq!(args_or_none("   "), None);
        assert_eq!(join_args(&["".into(), " -g ".into()]), "-g");
    }

    #[test]
    fn test_list_cleanup() {
        let list = vec![" a.cpp ".to_string(), "".to_string(), "b.cpp".to_string()];
        assert_eq!(list_or_none(&list), Some(vec!["a.cpp".into(), "b.cpp".into()]));
        assert_eq!(list_or_none(&["  ".to_string()]), None);
        assert!(list_or_empty(None).is_empty());
    }

    #[test]
    fn test_numeric_text() {
        assert_eq!(number_to_text(Some(10.0)), "10");
        assert_eq!(number_to_text(Some(2.5)), "2.5");
        assert_eq!(number_to_text(None), "");
        assert_eq!(text_to_number(" 2.5 "), Some(2.5));
        assert_eq!(text_to_number("abc"), None);
        assert_eq!(text_to_number(""), None);
        assert_eq!(text_to_integer("30"), Some(30));
        assert_eq!(text_to_integer("-1"), None);
    }
}
