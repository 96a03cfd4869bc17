// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Config document codec
//!
//! A config document is a YAML mapping with a reserved `_settings` key and
//! one key per stage, `camelCase(type)[:label]`, in execution order. On parse
//! the declaration order becomes a dependency chain; on serialize the chain
//! is walked back into key order. Absent optional fields are written as
//! explicit `null`, never omitted.

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;

use super::graph::{execution_order, ordered_sequence, DependencyGraph};
use super::labels::{generate_disambiguating_labels, title_case};
use crate::errors::{BuilderError, BuilderResult};
use crate::settings::{settings_equal, Settings, SettingsRaw};
use crate::stages::{lookup, Stage, StageId};

/// Reserved top-level key of the settings block
pub const SETTINGS_KEY: &str = "_settings";

/// A full pipeline definition
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub stage_deps: DependencyGraph,
    pub stage_data: HashMap<StageId, Stage>,
}

impl Config {
    /// Load a config document from a file
    pub fn from_file(path: &Path) -> BuilderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BuilderError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse a config document
    pub fn parse(yaml: &str) -> BuilderResult<Self> {
        let document: Value = serde_yaml::from_str(yaml)?;
        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => {
                return Err(BuilderError::invalid_document(
                    "top level must be a mapping of stage keys",
                    Some("Start the document with '_settings:' followed by one key per stage"),
                ))
            }
        };

        let mut config = Config::default();
        let mut previous: Option<StageId> = None;

        for (key, value) in mapping {
            let key = match key {
                Value::String(key) => key,
                other => {
                    return Err(BuilderError::invalid_document(
                        format!("stage key {:?} is not a string", other),
                        None,
                    ))
                }
            };

            if key == SETTINGS_KEY {
                let raw: SettingsRaw = if value.is_null() {
                    SettingsRaw::default()
                } else {
                    serde_yaml::from_value(value).map_err(|e| BuilderError::InvalidStage {
                        stage: SETTINGS_KEY.to_string(),
                        reason: e.to_string(),
                    })?
                };
                config.settings = Settings::from_raw(raw);
                continue;
            }

            let stage = parse_stage(&key, value)?;
            let id = StageId::new();
            config.stage_data.insert(id, stage);
            config.stage_deps.insert_node(id);
            if let Some(prev) = previous {
                config.stage_deps.add_dependency(id, prev);
            }
            previous = Some(id);
        }

        tracing::debug!(stages = config.stage_data.len(), "Parsed config document");
        Ok(config)
    }

    /// Build the document value: settings first, then stages in execution order
    pub fn to_document(&self) -> BuilderResult<Value> {
        let stage_data = generate_disambiguating_labels(&self.stage_data);
        let mut document = Mapping::new();

        document.insert(
            Value::String(SETTINGS_KEY.to_string()),
            serde_yaml::to_value(self.settings.to_raw())?,
        );

        for (key, stage) in ordered_sequence(&self.stage_deps, &stage_data)? {
            let raw = stage
                .config
                .to_raw_value()
                .map_err(|e| BuilderError::InvalidStage {
                    stage: key.clone(),
                    reason: e.to_string(),
                })?;

            let key = Value::String(key);
            if document.contains_key(&key) {
                return Err(BuilderError::DuplicateLabel {
                    stage: stage.name.clone(),
                    label: stage.label.clone(),
                });
            }
            document.insert(key, raw);
        }

        Ok(Value::Mapping(document))
    }

    /// Serialize to YAML text
    pub fn serialize(&self) -> BuilderResult<String> {
        Ok(serde_yaml::to_string(&self.to_document()?)?)
    }

    /// Write the serialized document to a file
    pub fn to_file(&self, path: &Path) -> BuilderResult<()> {
        let yaml = self.serialize()?;
        std::fs::write(path, yaml).map_err(|e| BuilderError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Stages with their keys, in execution order
    pub fn ordered_stages(&self) -> BuilderResult<Vec<(String, &Stage)>> {
        ordered_sequence(&self.stage_deps, &self.stage_data)
    }

    /// Stage ids in execution order
    pub fn execution_order(&self) -> BuilderResult<Vec<StageId>> {
        execution_order(&self.stage_deps)
    }

    /// Find a stage by its document key
    pub fn find_by_key(&self, key: &str) -> Option<StageId> {
        self.stage_data
            .iter()
            .find(|(_, stage)| stage.key() == key)
            .map(|(id, _)| *id)
    }

    /// Equality of two snapshots sharing stage ids
    ///
    /// Generated row ids inside configs are ignored.
    pub fn is_equal(&self, other: &Config) -> bool {
        settings_equal(&self.settings, &other.settings)
            && self.stage_deps == other.stage_deps
            && self.stage_data.len() == other.stage_data.len()
            && self.stage_data.iter().all(|(id, stage)| {
                other
                    .stage_data
                    .get(id)
                    .is_some_and(|theirs| stages_equal(stage, theirs))
            })
    }

    /// Equality of two configs regardless of stage ids, e.g. across parses
    pub fn is_equivalent(&self, other: &Config) -> bool {
        if !settings_equal(&self.settings, &other.settings) {
            return false;
        }

        match (self.ordered_stages(), other.ordered_stages()) {
            (Ok(ours), Ok(theirs)) => {
                ours.len() == theirs.len()
                    && ours
                        .iter()
                        .zip(&theirs)
                        .all(|((_, a), (_, b))| stages_equal(a, b))
            }
            _ => false,
        }
    }
}

fn parse_stage(key: &str, value: Value) -> BuilderResult<Stage> {
    let (type_key, label) = key.split_once(':').unwrap_or((key, ""));
    let name = title_case(type_key);

    match lookup(&name) {
        Some(stage_type) => {
            let config = stage_type
                .from_raw(value)
                .map_err(|e| BuilderError::InvalidStage {
                    stage: key.to_string(),
                    reason: e.to_string(),
                })?;

            Ok(Stage {
                name,
                label: label.to_string(),
                kind: stage_type.kind,
                config,
            })
        }
        None => {
            tracing::warn!(stage = %key, "Unsupported stage type, keeping raw configuration");
            let yaml = serde_yaml::to_string(&value)?;
            Ok(Stage::unsupported(type_key, label, yaml))
        }
    }
}

fn stages_equal(a: &Stage, b: &Stage) -> bool {
    if a.name != b.name || a.label != b.label {
        return false;
    }
    match (a.config.to_raw_value(), b.config.to_raw_value()) {
        (Ok(left), Ok(right)) => left == right,
        _ => a.config == b.config,
    }
}
