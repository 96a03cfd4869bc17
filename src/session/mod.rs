// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Builder session and save flow
//!
//! A session keeps the config as last loaded or saved next to the editor
//! working on a copy of it. Saving is split in three steps so the caller
//! owns the await: [`BuilderSession::begin_save`] serializes and raises the
//! in-flight flag, [`SaveRequest::submit`] talks to the collaborators, and
//! [`BuilderSession::finish_save`] folds the outcome back in.

mod store;
mod validator;

pub use store::{default_store_dir, ConfigPatch, ConfigStore, FilesystemStore};
pub use validator::{LocalValidator, Validator};

use std::collections::HashMap;

use crate::editor::GraphEditor;
use crate::errors::{BuilderError, BuilderResult};
use crate::pipeline::{Config, Diagnostic, SETTINGS_KEY};
use crate::stages::StageId;

/// Diagnostics sorted by the panel that shows them
#[derive(Debug, Clone, Default)]
pub struct RoutedDiagnostics {
    pub by_stage: HashMap<StageId, Vec<Diagnostic>>,
    pub settings: Vec<Diagnostic>,
    pub general: Vec<Diagnostic>,
}

impl RoutedDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.by_stage.is_empty() && self.settings.is_empty() && self.general.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.by_stage
            .values()
            .flatten()
            .chain(&self.settings)
            .chain(&self.general)
            .any(Diagnostic::is_error)
    }

    pub fn for_stage(&self, id: StageId) -> &[Diagnostic] {
        self.by_stage.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Send each diagnostic to its stage, the settings panel, or the general list
///
/// Locations naming a stage key that is not in `config` count as general.
pub fn route(diagnostics: &[Diagnostic], config: &Config) -> RoutedDiagnostics {
    let mut routed = RoutedDiagnostics::default();

    for diagnostic in diagnostics {
        let Some(location) = &diagnostic.location else {
            routed.general.push(diagnostic.clone());
            continue;
        };

        if location.stage == SETTINGS_KEY {
            routed.settings.push(diagnostic.clone());
        } else if let Some(id) = config.find_by_key(&location.stage) {
            routed.by_stage.entry(id).or_default().push(diagnostic.clone());
        } else {
            tracing::debug!(stage = %location.stage, "Diagnostic for unknown stage key");
            routed.general.push(diagnostic.clone());
        }
    }

    routed
}

/// Result of one save attempt
#[derive(Debug)]
pub enum SaveOutcome {
    /// Stored under `id`; `snapshot` is the config that was written
    Saved {
        id: u64,
        snapshot: Config,
        warnings: Vec<Diagnostic>,
    },
    /// Nothing changed since the last save
    Unchanged,
    /// The validator reported errors; nothing was stored
    Rejected { diagnostics: Vec<Diagnostic> },
    /// A collaborator failed
    Failed { error: BuilderError },
}

/// A serialized document on its way to the collaborators
#[derive(Debug)]
pub struct SaveRequest {
    yaml: String,
    config_id: Option<u64>,
    edited: bool,
    snapshot: Config,
}

impl SaveRequest {
    /// Document text being saved
    pub fn yaml(&self) -> &str {
        &self.yaml
    }

    /// Validate, then create or update the record
    pub async fn submit(self, validator: &dyn Validator, store: &dyn ConfigStore) -> SaveOutcome {
        if !self.edited && self.config_id.is_some() {
            return SaveOutcome::Unchanged;
        }

        let report = match validator.validate(&self.yaml, self.config_id).await {
            Ok(report) => report,
            Err(error) => return SaveOutcome::Failed { error },
        };

        if !report.is_success() {
            tracing::info!(errors = report.errors().count(), "Save rejected by validation");
            return SaveOutcome::Rejected {
                diagnostics: report.diagnostics,
            };
        }

        let stored = match self.config_id {
            Some(id) => {
                let patch = ConfigPatch {
                    config_yaml: Some(self.yaml),
                };
                store.update(id, &patch).await
            }
            None => store.create(&self.yaml).await,
        };

        match stored {
            Ok(id) => SaveOutcome::Saved {
                id,
                snapshot: self.snapshot,
                warnings: report.diagnostics,
            },
            Err(error) => SaveOutcome::Failed { error },
        }
    }
}

/// Editing session over one assignment config
pub struct BuilderSession {
    initial: Config,
    editor: GraphEditor,
    config_id: Option<u64>,
    saving: bool,
    diagnostics: RoutedDiagnostics,
}

impl BuilderSession {
    pub fn new(initial: Config, config_id: Option<u64>) -> Self {
        let editor = GraphEditor::new(initial.clone());
        Self {
            initial,
            editor,
            config_id,
            saving: false,
            diagnostics: RoutedDiagnostics::default(),
        }
    }

    /// Resume editing `current` against a previously stored `initial`
    pub fn resume(initial: Config, current: Config, config_id: Option<u64>) -> Self {
        Self {
            initial,
            editor: GraphEditor::new(current),
            config_id,
            saving: false,
            diagnostics: RoutedDiagnostics::default(),
        }
    }

    pub fn initial(&self) -> &Config {
        &self.initial
    }

    pub fn editor(&self) -> &GraphEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut GraphEditor {
        &mut self.editor
    }

    pub fn config_id(&self) -> Option<u64> {
        self.config_id
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn diagnostics(&self) -> &RoutedDiagnostics {
        &self.diagnostics
    }

    /// Whether the editing config differs from the last loaded or saved one
    pub fn is_edited(&self) -> bool {
        let current = self.editor.config();
        !(self.initial.is_equal(current) || self.initial.is_equivalent(current))
    }

    /// Serialize the editing config and mark a save in flight
    ///
    /// Generated labels are written into the editing config first, so the
    /// stored document and the stages share keys. Returns `None` while
    /// another save is in flight. A config that cannot be serialized fails
    /// without raising the flag.
    pub fn begin_save(&mut self) -> BuilderResult<Option<SaveRequest>> {
        if self.saving {
            tracing::debug!("Save already in flight");
            return Ok(None);
        }

        let relabelled = self.editor.assign_generated_labels();
        if relabelled > 0 {
            tracing::debug!(stages = relabelled, "Generated labels before save");
        }

        let snapshot = self.editor.config().clone();
        let yaml = snapshot.serialize()?;
        self.saving = true;

        Ok(Some(SaveRequest {
            yaml,
            config_id: self.config_id,
            edited: self.is_edited(),
            snapshot,
        }))
    }

    /// Fold a save outcome into the session and clear the in-flight flag
    pub fn finish_save(&mut self, outcome: &SaveOutcome) {
        self.saving = false;

        match outcome {
            SaveOutcome::Saved {
                id,
                snapshot,
                warnings,
            } => {
                self.initial = snapshot.clone();
                self.config_id = Some(*id);
                self.diagnostics = route(warnings, self.editor.config());
            }
            SaveOutcome::Rejected { diagnostics } => {
                self.diagnostics = route(diagnostics, self.editor.config());
            }
            SaveOutcome::Unchanged => {}
            SaveOutcome::Failed { error } => {
                tracing::warn!(%error, "Save failed");
            }
        }
    }

    pub fn dismiss_diagnostics(&mut self) {
        self.diagnostics = RoutedDiagnostics::default();
    }

    /// No outstanding error diagnostics
    pub fn can_advance(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineValidator, ValidationReport};
    use crate::stages::{lookup, StageConfig};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ConfigStore for MemoryStore {
        async fn create(&self, yaml: &str) -> BuilderResult<u64> {
            let mut records = self.records.lock().unwrap();
            records.push(yaml.to_string());
            Ok(records.len() as u64)
        }

        async fn update(&self, id: u64, patch: &ConfigPatch) -> BuilderResult<u64> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(id as usize - 1)
                .ok_or(BuilderError::ConfigNotFound { id })?;
            if let Some(yaml) = &patch.config_yaml {
                *record = yaml.clone();
            }
            Ok(id)
        }

        async fn fetch(&self, id: u64) -> BuilderResult<String> {
            self.records
                .lock()
                .unwrap()
                .get(id as usize - 1)
                .cloned()
                .ok_or(BuilderError::ConfigNotFound { id })
        }
    }

    struct FailingValidator;

    #[async_trait]
    impl Validator for FailingValidator {
        async fn validate(&self, _: &str, _: Option<u64>) -> BuilderResult<ValidationReport> {
            Err(BuilderError::ValidationService {
                message: "unreachable".into(),
            })
        }
    }

    fn session(yaml: &str) -> BuilderSession {
        BuilderSession::new(Config::parse(yaml).unwrap(), None)
    }

    fn save(session: &mut BuilderSession, store: &MemoryStore) -> SaveOutcome {
        let request = session.begin_save().unwrap().unwrap();
        let outcome = tokio_test::block_on(request.submit(&LocalValidator, store));
        session.finish_save(&outcome);
        outcome
    }

    #[test]
    fn test_is_edited() {
        let mut session = session("compile:\n  input: ['*.cpp']\nscore:\n");
        assert!(!session.is_edited());

        let first = session.editor().nodes()[0].id;
        let editor = session.editor_mut();
        let id = editor.duplicate_stage(first).unwrap();
        assert!(session.is_edited());

        session.editor_mut().delete_stage(id);
        assert!(!session.is_edited());
    }

    #[test]
    fn test_reentrant_save_is_noop() {
        let mut session = session("score:\n");
        let request = session.begin_save().unwrap();
        assert!(request.is_some());
        assert!(session.is_saving());
        assert!(session.begin_save().unwrap().is_none());

        session.finish_save(&SaveOutcome::Unchanged);
        assert!(!session.is_saving());
        assert!(session.begin_save().unwrap().is_some());
    }

    #[test]
    fn test_malformed_graph_does_not_raise_flag() {
        let mut session = session("compile:\n  input: ['*.cpp']\n");
        session
            .editor_mut()
            .insert_stage(lookup("Score").unwrap(), Default::default(), None);

        assert!(matches!(session.begin_save(), Err(BuilderError::MalformedGraph { .. })));
        assert!(!session.is_saving());
    }

    #[test]
    fn test_create_then_update() {
        let store = MemoryStore::default();
        let mut session = session("compile:\n  input: ['*.cpp']\n");

        let outcome = save(&mut session, &store);
        assert!(matches!(outcome, SaveOutcome::Saved { id: 1, .. }));
        assert_eq!(session.config_id(), Some(1));

        assert!(matches!(save(&mut session, &store), SaveOutcome::Unchanged));

        let id = session.editor().nodes()[0].id;
        let mut config = session.editor().stage(id).unwrap().config.clone();
        if let StageConfig::Compile(compile) = &mut config {
            compile.flags = "-O2 -Wall".into();
        }
        session.editor_mut().update_config(id, config).unwrap();
        assert!(session.is_edited());

        assert!(matches!(save(&mut session, &store), SaveOutcome::Saved { id: 1, .. }));
        assert!(!session.is_edited());
        let stored = tokio_test::block_on(store.fetch(1)).unwrap();
        assert!(stored.contains("-O2"));
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_save_routes_diagnostics() {
        let store = MemoryStore::default();
        let mut session = session("_settings:\n  lang: ':1'\ncompile:all:\n  input: []\n");

        let outcome = save(&mut session, &store);
        assert!(matches!(outcome, SaveOutcome::Rejected { .. }));
        assert!(store.records.lock().unwrap().is_empty());
        assert!(!session.can_advance());

        let id = session.editor().nodes()[0].id;
        assert_eq!(session.diagnostics().for_stage(id).len(), 1);
        assert_eq!(session.diagnostics().settings.len(), 1);

        session.dismiss_diagnostics();
        assert!(session.can_advance());
    }

    #[test]
    fn test_generated_labels_route_to_stages() {
        let store = MemoryStore::default();
        let mut session = session("compile:\n  input: ['*.cpp']\nstdioTest:a:\nstdioTest:b:\n");
        let order = session.editor().config().execution_order().unwrap();
        session.editor_mut().set_label(order[1], "").unwrap();
        session.editor_mut().set_label(order[2], "").unwrap();

        // Both stdio stages have no cases, which only warns
        let outcome = save(&mut session, &store);
        let SaveOutcome::Saved { warnings, .. } = &outcome else {
            panic!("Expected a save, got {:?}", outcome);
        };
        assert_eq!(warnings.len(), 2);

        let diagnostics = session.diagnostics();
        assert!(diagnostics.general.is_empty());
        assert_eq!(diagnostics.for_stage(order[1]).len(), 1);
        assert_eq!(diagnostics.for_stage(order[2]).len(), 1);

        let stored = Config::parse(&tokio_test::block_on(store.fetch(1)).unwrap()).unwrap();
        for id in &order[1..] {
            let key = session.editor().stage(*id).unwrap().key();
            assert_ne!(key, "stdioTest");
            assert!(stored.find_by_key(&key).is_some());
        }
        assert!(!session.is_edited());
    }

    #[test]
    fn test_collaborator_failure_keeps_state() {
        let store = MemoryStore::default();
        let mut session = session("score:\n");

        let request = session.begin_save().unwrap().unwrap();
        let outcome = tokio_test::block_on(request.submit(&FailingValidator, &store));
        session.finish_save(&outcome);

        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
        assert_eq!(session.config_id(), None);
        assert!(!session.is_saving());
    }

    #[test]
    fn test_route_general_and_unknown() {
        let config = Config::parse("compile:\n").unwrap();
        let diagnostics = vec![
            Diagnostic::error("X", "general"),
            Diagnostic::error("X", "stale").at("make:gone", None),
            Diagnostic::warning("X", "stage").at("compile", Some("input")),
        ];

        let routed = route(&diagnostics, &config);
        assert_eq!(routed.general.len(), 2);
        assert_eq!(routed.by_stage.len(), 1);

        let report = PipelineValidator::validate(&config);
        assert_eq!(route(&report.diagnostics, &config).by_stage.len(), 1);
    }
}
