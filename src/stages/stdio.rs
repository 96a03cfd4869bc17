// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Standard I/O test cases graded by string comparison
//!
//! A test case feeds stdin either inline or from a helper file and compares
//! stdout against inline text or a helper file. The editor needs to know
//! which of the two widgets to render, so the tidy shape carries an explicit
//! [`InputMode`] per field and keeps both texts around while the instructor
//! switches between them.

use serde::{Deserialize, Serialize};

use super::normalize::{
    args_or_none, join_args, list_or_empty, list_or_none, number_to_text, text_or_none,
    text_to_number,
};
use super::valgrind::{Valgrind, ValgrindRaw};
use super::{StageShape, Visibility};

/// Where a test case reads its input or expected output from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    None,
    Text,
    File,
}

impl InputMode {
    /// Inline text wins when both are present
    fn detect(text: &Option<String>, file: &Option<String>) -> Self {
        match (text, file) {
            (Some(_), _) => Self::Text,
            (None, Some(_)) => Self::File,
            (None, None) => Self::None,
        }
    }
}

/// Raw test case entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StdioTestCaseRaw {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub stdin: Option<String>,
    #[serde(default)]
    pub file_stdin: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub file_expected: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub hide_from_report: Option<bool>,
    #[serde(default)]
    pub valgrind: Option<ValgrindRaw>,
}

/// Editor shape of one test case
#[derive(Debug, Clone, PartialEq)]
pub struct StdioTestCase {
    pub id: u32,
    /// Executable under test
    pub file: String,
    pub args: String,
    pub stdin_mode: InputMode,
    pub stdin: String,
    pub file_stdin: String,
    pub expected_mode: InputMode,
    pub expected: String,
    pub file_expected: String,
    pub visibility: Visibility,
    pub score: String,
    pub hide_from_report: bool,
    /// Whether this test case overrides the memory checking settings
    pub valgrind_override: bool,
    pub valgrind: Valgrind,
}

impl StdioTestCase {
    /// Fresh test case running `a.out` with no input
    pub fn new(id: u32) -> Self {
        Self {
            id,
            file: "a.out".to_string(),
            args: String::new(),
            stdin_mode: InputMode::None,
            stdin: String::new(),
            file_stdin: String::new(),
            expected_mode: InputMode::Text,
            expected: String::new(),
            file_expected: String::new(),
            visibility: Visibility::default(),
            score: "1".to_string(),
            hide_from_report: false,
            valgrind_override: false,
            valgrind: Valgrind::default(),
        }
    }

    fn from_raw(raw: StdioTestCaseRaw) -> Self {
        Self {
            id: raw.id,
            file: raw.file,
            args: join_args(&list_or_empty(raw.args)),
            stdin_mode: InputMode::detect(&raw.stdin, &raw.file_stdin),
            stdin: raw.stdin.unwrap_or_default(),
            file_stdin: raw.file_stdin.unwrap_or_default(),
            expected_mode: InputMode::detect(&raw.expected, &raw.file_expected),
            expected: raw.expected.unwrap_or_default(),
            file_expected: raw.file_expected.unwrap_or_default(),
            visibility: raw.visibility.unwrap_or_default(),
            score: number_to_text(raw.score),
            hide_from_report: raw.hide_from_report.unwrap_or(false),
            valgrind_override: raw.valgrind.is_some(),
            valgrind: raw.valgrind.map(Valgrind::from_raw).unwrap_or_default(),
        }
    }

    fn to_raw(&self) -> StdioTestCaseRaw {
        let (stdin, file_stdin) = split_mode(self.stdin_mode, &self.stdin, &self.file_stdin);
        let (expected, file_expected) =
            split_mode(self.expected_mode, &self.expected, &self.file_expected);

        StdioTestCaseRaw {
            id: self.id,
            file: self.file.trim().to_string(),
            args: args_or_none(&self.args),
            stdin,
            file_stdin,
            expected,
            file_expected,
            visibility: Some(self.visibility),
            score: text_to_number(&self.score),
            hide_from_report: Some(self.hide_from_report),
            valgrind: self.valgrind_override.then(|| self.valgrind.to_raw()),
        }
    }
}

/// Inline text is kept verbatim; file names are trimmed
fn split_mode(mode: InputMode, text: &str, file: &str) -> (Option<String>, Option<String>) {
    match mode {
        InputMode::None => (None, None),
        InputMode::Text => (Some(text.to_string()), None),
        InputMode::File => (None, text_or_none(file)),
    }
}

/// Raw `stdioTest` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StdioTestRaw {
    #[serde(default, rename = "testCases")]
    pub test_cases: Vec<StdioTestCaseRaw>,
    #[serde(default)]
    pub diff_ignore_flags: Option<Vec<String>>,
    #[serde(default)]
    pub additional_packages: Option<Vec<String>>,
    #[serde(default)]
    pub additional_pip_packages: Option<Vec<String>>,
}

/// Runs executables with given stdin and compares their stdout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StdioTest {
    pub test_cases: Vec<StdioTestCase>,
    pub diff_ignore_flags: Vec<String>,
    pub additional_packages: Vec<String>,
    pub additional_pip_packages: Vec<String>,
}

impl StdioTest {
    /// Append a test case numbered after the highest existing id
    pub fn add_test_case(&mut self) -> &mut StdioTestCase {
        let next = self.test_cases.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.test_cases.push(StdioTestCase::new(next));
        let last = self.test_cases.len() - 1;
        &mut self.test_cases[last]
    }
}

impl StageShape for StdioTest {
    type Raw = StdioTestRaw;

    fn from_raw(raw: Self::Raw) -> Self {
        Self {
            test_cases: raw.test_cases.into_iter().map(StdioTestCase::from_raw).collect(),
            diff_ignore_flags: list_or_empty(raw.diff_ignore_flags),
            additional_packages: list_or_empty(raw.additional_packages),
            additional_pip_packages: list_or_empty(raw.additional_pip_packages),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        StdioTestRaw {
            test_cases: self.test_cases.iter().map(StdioTestCase::to_raw).collect(),
            diff_ignore_flags: list_or_none(&self.diff_ignore_flags),
            additional_packages: list_or_none(&self.additional_packages),
            additional_pip_packages: list_or_none(&self.additional_pip_packages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> StdioTest {
        StdioTest::from_raw(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_input_modes_detected() {
        let stage = parse(
            r#"
testCases:
  - id: 1
    file: a.out
    stdin: "1 2\n"
    expected: "3\n"
  - id: 2
    file: a.out
    file_stdin: in2.txt
    file_expected: out2.txt
  - id: 3
    file: a.out
"#,
        );

        let modes: Vec<_> = stage
            .test_cases
            .iter()
            .map(|t| (t.stdin_mode, t.expected_mode))
            .collect();
        assert_eq!(
            modes,
            vec![
                (InputMode::Text, InputMode::Text),
                (InputMode::File, InputMode::File),
                (InputMode::None, InputMode::None),
            ]
        );
    }

    #[test]
    fn test_inline_text_wins_over_file() {
        let stage = parse("testCases:\n  - id: 1\n    stdin: abc\n    file_stdin: in.txt\n");
        let case = &stage.test_cases[0];
        assert_eq!(case.stdin_mode, InputMode::Text);

        let raw = case.to_raw();
        assert_eq!(raw.stdin.as_deref(), Some("abc"));
        assert_eq!(raw.file_stdin, None);
    }

    #[test]
    fn test_mode_switch_emits_selected_field_only() {
        let mut stage = parse("testCases:\n  - id: 1\n    stdin: abc\n");
        let case = &mut stage.test_cases[0];
        case.file_stdin = " in.txt ".into();
        case.stdin_mode = InputMode::File;

        let raw = case.to_raw();
        assert_eq!(raw.stdin, None);
        assert_eq!(raw.file_stdin.as_deref(), Some("in.txt"));
    }

    #[test]
    fn test_valgrind_override_flag() {
        let stage = parse(
            r#"
testCases:
  - id: 1
    valgrind:
      enabled: false
  - id: 2
"#,
        );

        assert!(stage.test_cases[0].valgrind_override);
        assert!(!stage.test_cases[0].valgrind.enabled);
        assert!(!stage.test_cases[1].valgrind_override);
        assert!(stage.test_cases[1].valgrind.enabled);

        let raw = stage.to_raw();
        assert_eq!(raw.test_cases[0].valgrind.as_ref().unwrap().enabled, Some(false));
        assert_eq!(raw.test_cases[1].valgrind, None);
    }

    #[test]
    fn test_round_trip_keeps_whitespace_in_text() {
        let raw = StdioTestRaw {
            test_cases: vec![StdioTestCaseRaw {
                id: 4,
                file: "a.out".into(),
                args: Some(vec!["--fast".into()]),
                stdin: Some("  padded input \n".into()),
                file_stdin: None,
                expected: None,
                file_expected: Some("expected4.txt".into()),
                visibility: Some(Visibility::AlwaysHidden),
                score: Some(2.0),
                hide_from_report: Some(true),
                valgrind: None,
            }],
            diff_ignore_flags: Some(vec!["TRAILING_WHITESPACE".into()]),
            additional_packages: None,
            additional_pip_packages: None,
        };

        assert_eq!(StdioTest::from_raw(raw.clone()).to_raw(), raw);
    }

    #[test]
    fn test_add_test_case_numbers_after_max() {
        let mut stage = parse("testCases:\n  - id: 7\n  - id: 3\n");
        let added = stage.add_test_case();
        assert_eq!(added.id, 8);
        assert_eq!(stage.test_cases.len(), 3);

        let mut empty = StdioTest::default();
        assert_eq!(empty.add_test_case().id, 1);
    }
}
