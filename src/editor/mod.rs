// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Interactive graph editor state
//!
//! [`GraphEditor`] owns the config being edited together with its canvas
//! projection: positioned nodes and dependency edges. Every structural
//! operation updates the dependency graph, the stage map and the visual
//! collections together. Stale ids are logged and ignored.

mod events;
mod layout;

pub use events::CanvasEvent;
pub use layout::{layered_positions, NODE_HEIGHT, NODE_SEP, NODE_WIDTH, RANK_SEP};

use serde::{Deserialize, Serialize};

use crate::errors::{BuilderError, BuilderResult};
use crate::pipeline::{camel_case, delete_node, generate_disambiguating_labels, Config};
use crate::stages::{palette, Stage, StageConfig, StageId, StageKind, StageType};

/// Vertical offset of a duplicated node below its source
pub const DUPLICATE_OFFSET: f64 = 100.0;

/// Canvas coordinate of a node's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A stage on the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: StageId,
    pub position: Position,
    pub label: String,
    pub selected: bool,
}

/// A dependency on the canvas; `target` depends on `source`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: StageId,
    pub target: StageId,
}

impl Edge {
    pub fn new(source: StageId, target: StageId) -> Self {
        Self {
            id: edge_id(source, target),
            source,
            target,
        }
    }
}

/// `edge-<source>-<target>`
pub fn edge_id(source: StageId, target: StageId) -> String {
    format!("edge-{}-{}", source, target)
}

/// Mutable editing session over one config
#[derive(Debug, Clone)]
pub struct GraphEditor {
    config: Config,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    dragging: Option<&'static StageType>,
}

impl GraphEditor {
    /// Build nodes and edges from a config, then lay them out
    pub fn new(config: Config) -> Self {
        let order = config.execution_order().unwrap_or_else(|_| {
            let mut ids: Vec<StageId> = config.stage_data.keys().copied().collect();
            ids.sort();
            ids
        });

        let nodes = order
            .into_iter()
            .filter_map(|id| {
                config.stage_data.get(&id).map(|stage| Node {
                    id,
                    position: Position::default(),
                    label: stage.display_label(),
                    selected: false,
                })
            })
            .collect();

        let mut editor = Self {
            config,
            nodes,
            edges: Vec::new(),
            dragging: None,
        };
        editor.sync_edges();
        editor.layout();

        tracing::debug!(
            nodes = editor.nodes.len(),
            edges = editor.edges.len(),
            "Initialized graph editor"
        );
        editor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: StageId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.config.stage_data.get(&id)
    }

    /// Stage type currently dragged from the palette
    pub fn dragging(&self) -> Option<&'static StageType> {
        self.dragging
    }

    /// Palette entries grouped by kind
    pub fn palette(&self) -> Vec<(StageKind, Vec<&'static StageType>)> {
        palette()
    }

    /// Recompute node positions from the edges
    ///
    /// Without edges every node keeps its position.
    pub fn layout(&mut self) {
        let ids: Vec<StageId> = self.nodes.iter().map(|n| n.id).collect();
        let edges: Vec<(StageId, StageId)> =
            self.edges.iter().map(|e| (e.source, e.target)).collect();

        if let Some(positions) = layered_positions(&ids, &edges) {
            for node in &mut self.nodes {
                if let Some(position) = positions.get(&node.id) {
                    node.position = *position;
                }
            }
        }
    }

    /// Add a stage of `stage_type` at `position`
    ///
    /// Without a parent the stage is disconnected. With a parent it is
    /// spliced in right after it: a sole successor of the parent is moved
    /// behind the new stage.
    pub fn insert_stage(
        &mut self,
        stage_type: &StageType,
        position: Position,
        parent: Option<StageId>,
    ) -> Option<StageId> {
        if let Some(parent) = parent {
            if !self.config.stage_data.contains_key(&parent) {
                tracing::warn!(stage = %parent, "Cannot insert after unknown stage");
                return None;
            }
        }

        let id = StageId::new();
        let stage = Stage::new(stage_type);
        let label = stage.display_label();
        self.config.stage_data.insert(id, stage);
        self.config.stage_deps.insert_node(id);

        if let Some(parent) = parent {
            if let [successor] = self.config.stage_deps.successors(parent).as_slice() {
                self.config.stage_deps.remove_dependency(*successor, parent);
                self.config.stage_deps.add_dependency(*successor, id);
            }
            self.config.stage_deps.add_dependency(id, parent);
        }

        self.nodes.push(Node {
            id,
            position,
            label,
            selected: false,
        });
        self.sync_edges();
        self.layout();

        tracing::debug!(stage = %id, kind = %stage_type.kind, "Inserted {}", stage_type.name);
        Some(id)
    }

    /// Begin dragging a stage type from the palette
    pub fn start_drag(&mut self, stage_type: &'static StageType) {
        self.dragging = Some(stage_type);
    }

    /// Drop the dragged stage type; no-op when nothing is dragged
    pub fn drop_dragged(&mut self, position: Position, parent: Option<StageId>) -> Option<StageId> {
        let stage_type = self.dragging.take()?;
        self.insert_stage(stage_type, position, parent)
    }

    /// Remove a stage, re-linking its dependents to its dependencies
    pub fn delete_stage(&mut self, id: StageId) -> bool {
        let Some(graph) = delete_node(id, &self.config.stage_deps) else {
            return false;
        };

        self.config.stage_deps = graph;
        self.config.stage_data.remove(&id);
        self.nodes.retain(|n| n.id != id);
        self.sync_edges();
        self.layout();

        tracing::debug!(stage = %id, "Deleted stage");
        true
    }

    /// Make `target` depend on `source`
    ///
    /// Self loops, duplicates, unknown stages and cycles are refused.
    pub fn connect(&mut self, source: StageId, target: StageId) -> bool {
        if !self.config.stage_data.contains_key(&source)
            || !self.config.stage_data.contains_key(&target)
        {
            tracing::warn!(%source, %target, "Cannot connect unknown stages");
            return false;
        }
        if self.config.stage_deps.would_create_cycle(source, target) {
            tracing::warn!(%source, %target, "Connection would create a cycle");
            return false;
        }
        if !self.config.stage_deps.add_dependency(target, source) {
            return false;
        }

        self.sync_edges();
        self.layout();
        true
    }

    /// Remove the dependency behind an edge id
    pub fn disconnect(&mut self, edge_id: &str) -> bool {
        let Some(edge) = self.edges.iter().find(|e| e.id == edge_id).cloned() else {
            tracing::warn!(edge = edge_id, "Cannot disconnect unknown edge");
            return false;
        };

        self.config.stage_deps.remove_dependency(edge.target, edge.source);
        self.sync_edges();
        self.layout();
        true
    }

    /// Copy a stage into a new disconnected, selected node below the source
    pub fn duplicate_stage(&mut self, id: StageId) -> Option<StageId> {
        let (Some(stage), Some(node)) = (self.config.stage_data.get(&id), self.node(id)) else {
            tracing::warn!(stage = %id, "Cannot duplicate unknown stage");
            return None;
        };

        let mut copy = stage.clone();
        copy.label = self.free_label(&stage.name, &camel_case(&format!("{} Copy", stage.label)));
        let position = Position::new(node.position.x, node.position.y + DUPLICATE_OFFSET);

        let new_id = StageId::new();
        let label = copy.display_label();
        self.config.stage_data.insert(new_id, copy);
        self.config.stage_deps.insert_node(new_id);

        for node in &mut self.nodes {
            node.selected = false;
        }
        self.nodes.push(Node {
            id: new_id,
            position,
            label,
            selected: true,
        });

        tracing::debug!(stage = %id, copy = %new_id, "Duplicated stage");
        Some(new_id)
    }

    /// Select one node and deselect every other
    ///
    /// An unknown id leaves the selection untouched.
    pub fn select(&mut self, id: StageId) -> bool {
        if self.node(id).is_none() {
            tracing::warn!(stage = %id, "Cannot select unknown stage");
            return false;
        }
        for node in &mut self.nodes {
            node.selected = node.id == id;
        }
        true
    }

    pub fn deselect(&mut self, id: StageId) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.selected = false;
        }
    }

    pub fn deselect_all(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    /// The selected stage, only when exactly one is selected
    pub fn selected_stage(&self) -> Option<StageId> {
        let mut selected = self.nodes.iter().filter(|n| n.selected);
        match (selected.next(), selected.next()) {
            (Some(node), None) => Some(node.id),
            _ => None,
        }
    }

    /// Move a node without touching the graph
    pub fn move_node(&mut self, id: StageId, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Rename a stage
    ///
    /// Fails when another stage of the same type already uses the label.
    pub fn set_label(&mut self, id: StageId, label: &str) -> BuilderResult<()> {
        let label = label.trim();
        let stage = self
            .config
            .stage_data
            .get(&id)
            .ok_or_else(|| BuilderError::StageNotFound { key: id.to_string() })?;

        if !label.is_empty() && self.label_taken(&stage.name, label, Some(id)) {
            return Err(BuilderError::DuplicateLabel {
                stage: stage.name.clone(),
                label: label.to_string(),
            });
        }

        if let Some(stage) = self.config.stage_data.get_mut(&id) {
            stage.label = label.to_string();
        }
        self.refresh_label(id);
        Ok(())
    }

    /// Label stages that share an empty label with others of their type
    ///
    /// Writes the labels serialization would generate back into the config,
    /// so document keys and diagnostics match the stages being edited.
    /// Returns the number of relabelled stages.
    pub fn assign_generated_labels(&mut self) -> usize {
        let labelled = generate_disambiguating_labels(&self.config.stage_data);
        let changed: Vec<StageId> = labelled
            .iter()
            .filter(|(id, stage)| {
                self.config
                    .stage_data
                    .get(id)
                    .is_some_and(|current| current.label != stage.label)
            })
            .map(|(id, _)| *id)
            .collect();

        self.config.stage_data = labelled;
        for id in &changed {
            self.refresh_label(*id);
        }
        changed.len()
    }

    /// Replace a stage's configuration with one of the same type
    pub fn update_config(&mut self, id: StageId, config: StageConfig) -> BuilderResult<()> {
        let stage = self
            .config
            .stage_data
            .get_mut(&id)
            .ok_or_else(|| BuilderError::StageNotFound { key: id.to_string() })?;

        if config.type_name() != stage.config.type_name() {
            return Err(BuilderError::InvalidStage {
                stage: stage.key(),
                reason: format!(
                    "expected {} configuration, got {}",
                    stage.name,
                    config.type_name().unwrap_or("unsupported")
                ),
            });
        }

        stage.config = config;
        Ok(())
    }

    /// Fold one canvas event into the state
    pub fn apply(&mut self, event: CanvasEvent) -> bool {
        events::apply(self, event)
    }

    /// Rebuild edges from the dependency graph, in node order
    fn sync_edges(&mut self) {
        let order: Vec<StageId> = self.nodes.iter().map(|n| n.id).collect();
        let position = |id: &StageId| order.iter().position(|n| n == id).unwrap_or(usize::MAX);

        let mut relations: Vec<(StageId, StageId)> = self.config.stage_deps.relations().collect();
        relations.sort_by_key(|(source, target)| (position(target), position(source)));

        self.edges = relations
            .into_iter()
            .map(|(source, target)| Edge::new(source, target))
            .collect();
    }

    fn refresh_label(&mut self, id: StageId) {
        let Some(label) = self.config.stage_data.get(&id).map(Stage::display_label) else {
            return;
        };
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.label = label;
        }
    }

    fn label_taken(&self, name: &str, label: &str, except: Option<StageId>) -> bool {
        self.config
            .stage_data
            .iter()
            .any(|(id, s)| Some(*id) != except && s.name == name && s.label == label)
    }

    /// `base`, or `base2`, `base3`, ... when taken by a stage of the same type
    fn free_label(&self, name: &str, base: &str) -> String {
        if !self.label_taken(name, base, None) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.label_taken(name, candidate, None))
            .unwrap_or_else(|| base.to_string())
    }
}
