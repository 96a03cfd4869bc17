// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Pipeline-wide settings
//!
//! The `_settings` block of a config document. The language is stored as a
//! single `language[/compiler][:version]` string on the wire and edited as
//! three fields; template file names get row ids for list editing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stages::normalize::{
    clean_list, integer_to_text, list_or_empty, list_or_none, number_to_text, text_to_integer,
    text_to_number,
};

/// Language, optional compiler and optional version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lang {
    pub language: String,
    pub compiler: Option<String>,
    pub version: Option<String>,
}

impl Lang {
    /// Parse `language[/compiler][:version]`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, version) = match raw.rsplit_once(':') {
            Some((head, version)) => (head, Some(version.to_string())),
            None => (raw, None),
        };
        let (language, compiler) = match head.split_once('/') {
            Some((language, compiler)) => (language, Some(compiler.to_string())),
            None => (head, None),
        };

        Self {
            language: language.to_string(),
            compiler,
            version,
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self {
            language: "cpp".to_string(),
            compiler: Some("g++".to_string()),
            version: Some("8".to_string()),
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.language)?;
        if let Some(compiler) = &self.compiler {
            write!(f, "/{}", compiler)?;
        }
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

/// How template files are matched against the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UseTemplate {
    Filenames,
    Path,
}

/// One template file row
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Row identity for list editing, never serialized
    pub id: Uuid,
    pub name: String,
}

impl TemplateFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Optional sandbox features
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub network: Option<bool>,
}

/// Raw `_settings` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRaw {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub use_template: Option<UseTemplate>,
    #[serde(default)]
    pub template: Option<Vec<String>>,
    #[serde(default)]
    pub use_skeleton: Option<bool>,
    #[serde(default)]
    pub use_provided: Option<bool>,
    #[serde(default)]
    pub stage_wait_duration_secs: Option<u64>,
    #[serde(default)]
    pub cpus: Option<f64>,
    #[serde(default)]
    pub mem_gb: Option<f64>,
    #[serde(default)]
    pub early_return_on_throw: Option<bool>,
    #[serde(default)]
    pub enable_features: Option<Features>,
}

/// Editor shape of the settings block
#[derive(Debug, Clone)]
pub struct Settings {
    pub lang: Lang,
    pub use_template: Option<UseTemplate>,
    pub template: Vec<TemplateFile>,
    pub use_skeleton: bool,
    pub use_provided: bool,
    pub stage_wait_duration_secs: String,
    pub cpus: String,
    pub mem_gb: String,
    pub early_return_on_throw: bool,
    pub network: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(SettingsRaw::default())
    }
}

impl Settings {
    /// Normalize a parsed `_settings` block
    pub fn from_raw(raw: SettingsRaw) -> Self {
        Self {
            lang: raw.lang.as_deref().map(Lang::parse).unwrap_or_default(),
            use_template: raw.use_template,
            template: list_or_empty(raw.template)
                .into_iter()
                .map(TemplateFile::new)
                .collect(),
            use_skeleton: raw.use_skeleton.unwrap_or(true),
            use_provided: raw.use_provided.unwrap_or(true),
            stage_wait_duration_secs: integer_to_text(raw.stage_wait_duration_secs),
            cpus: number_to_text(raw.cpus),
            mem_gb: number_to_text(raw.mem_gb),
            early_return_on_throw: raw.early_return_on_throw.unwrap_or(false),
            network: raw.enable_features.and_then(|f| f.network).unwrap_or(false),
        }
    }

    /// Convert back into the wire shape
    pub fn to_raw(&self) -> SettingsRaw {
        let names: Vec<String> = self.template.iter().map(|t| t.name.clone()).collect();

        SettingsRaw {
            lang: Some(self.lang.to_string()),
            use_template: self.use_template,
            template: list_or_none(&names),
            use_skeleton: Some(self.use_skeleton),
            use_provided: Some(self.use_provided),
            stage_wait_duration_secs: text_to_integer(&self.stage_wait_duration_secs),
            cpus: text_to_number(&self.cpus),
            mem_gb: text_to_number(&self.mem_gb),
            early_return_on_throw: Some(self.early_return_on_throw),
            enable_features: Some(Features {
                network: Some(self.network),
            }),
        }
    }

    /// Template names as serialized, sorted for order-insensitive comparison
    fn template_names(&self) -> Vec<String> {
        let names: Vec<String> = self.template.iter().map(|t| t.name.clone()).collect();
        let mut cleaned = clean_list(&names);
        cleaned.sort();
        cleaned
    }
}

/// Compare two settings, ignoring row ids and template order
pub fn settings_equal(a: &Settings, b: &Settings) -> bool {
    a.lang == b.lang
        && a.use_template == b.use_template
        && a.template_names() == b.template_names()
        && a.use_skeleton == b.use_skeleton
        && a.use_provided == b.use_provided
        && a.stage_wait_duration_secs == b.stage_wait_duration_secs
        && a.cpus == b.cpus
        && a.mem_gb == b.mem_gb
        && a.early_return_on_throw == b.early_return_on_throw
        && a.network == b.network
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_with_compiler() {
        let lang = Lang::parse("cpp/g++:8");
        assert_eq!(lang.language, "cpp");
        assert_eq!(lang.compiler.as_deref(), Some("g++"));
        assert_eq!(lang.version.as_deref(), Some("8"));
        assert_eq!(lang.to_string(), "cpp/g++:8");
    }

    #[test]
    fn test_lang_without_compiler() {
        let lang = Lang::parse("python:3.10");
        assert_eq!(lang.language, "python");
        assert_eq!(lang.compiler, None);
        assert_eq!(lang.version.as_deref(), Some("3.10"));
        assert_eq!(lang.to_string(), "python:3.10");
    }

    #[test]
    fn test_lang_without_version() {
        let lang = Lang::parse("python");
        assert_eq!(lang.language, "python");
        assert_eq!(lang.version, None);
        assert_eq!(lang.to_string(), "python");

        let lang = Lang::parse("cpp/clang++");
        assert_eq!(lang.compiler.as_deref(), Some("clang++"));
        assert_eq!(lang.to_string(), "cpp/clang++");

        // A trailing colon is kept as an empty version
        assert_eq!(Lang::parse("python:").to_string(), "python:");
    }

    #[test]
    fn test_absent_template_written_as_null() {
        let settings = Settings::from_raw(SettingsRaw::default());
        assert_eq!(settings.to_raw().template, None);

        let raw: SettingsRaw = serde_yaml::from_str("template: ['  ']\n").unwrap();
        assert_eq!(Settings::from_raw(raw).to_raw().template, None);
    }

    #[test]
    fn test_template_ids_and_cleanup() {
        let raw: SettingsRaw =
            serde_yaml::from_str("lang: java:11\ntemplate: [Main.java, ' Util.java ']\n").unwrap();
        let mut settings = Settings::from_raw(raw);
        assert_eq!(settings.template.len(), 2);
        assert_ne!(settings.template[0].id, settings.template[1].id);

        settings.template.push(TemplateFile::new("   "));
        let back = settings.to_raw();
        assert_eq!(
            back.template,
            Some(vec!["Main.java".to_string(), "Util.java".to_string()])
        );
    }

    #[test]
    fn test_settings_round_trip() {
        let yaml = r#"
lang: cpp/g++:8
use_template: FILENAMES
template: [main.cpp]
use_skeleton: true
use_provided: false
stage_wait_duration_secs: 10
cpus: 2
mem_gb: 4
early_return_on_throw: true
enable_features:
  network: false
"#;
        let raw: SettingsRaw = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(Settings::from_raw(raw.clone()).to_raw(), raw);
    }

    #[test]
    fn test_equality_ignores_ids_and_template_order() {
        let raw: SettingsRaw = serde_yaml::from_str("template: [a.cpp, b.cpp]\n").unwrap();
        let a = Settings::from_raw(raw);
        let mut b = a.clone();
        b.template.reverse();
        for t in &mut b.template {
            t.id = Uuid::new_v4();
        }
        assert!(settings_equal(&a, &b));

        b.cpus = "4".into();
        assert!(!settings_equal(&a, &b));
    }

    #[test]
    fn test_absent_block_serializes_explicit_nulls() {
        let yaml = serde_yaml::to_string(&Settings::default().to_raw()).unwrap();
        assert!(yaml.contains("use_template: null"));
        assert!(yaml.contains("cpus: null"));
        assert!(yaml.contains("cpp/g++:8"));
    }
}
