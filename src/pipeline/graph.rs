// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Stage dependency graph
//!
//! Adjacency list from a stage to the stages it depends on. The editor keeps
//! the graph a single chain, but the algorithms here work on any DAG; only
//! [`execution_order`] insists on the chain shape because the document format
//! encodes order by key position.

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet};

use crate::errors::{BuilderError, BuilderResult};
use crate::stages::{Stage, StageId};

/// Map from stage to the stages it must run after
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    deps: HashMap<StageId, Vec<StageId>>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without dependencies; existing nodes are left alone
    pub fn insert_node(&mut self, id: StageId) {
        self.deps.entry(id).or_default();
    }

    /// Whether the graph has an entry for `id`
    pub fn contains(&self, id: StageId) -> bool {
        self.deps.contains_key(&id)
    }

    /// Dependencies of a node, empty for unknown nodes
    pub fn dependencies(&self, id: StageId) -> &[StageId] {
        self.deps.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record that `id` runs after `dependency`; returns false if already recorded
    pub fn add_dependency(&mut self, id: StageId, dependency: StageId) -> bool {
        let deps = self.deps.entry(id).or_default();
        if deps.contains(&dependency) {
            return false;
        }
        deps.push(dependency);
        true
    }

    /// Drop one dependency; returns false if it was not recorded
    pub fn remove_dependency(&mut self, id: StageId, dependency: StageId) -> bool {
        match self.deps.get_mut(&id) {
            Some(deps) => {
                let before = deps.len();
                deps.retain(|d| *d != dependency);
                deps.len() != before
            }
            None => false,
        }
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = StageId> + '_ {
        self.deps.keys().copied()
    }

    /// All `(dependency, dependent)` pairs
    pub fn relations(&self) -> impl Iterator<Item = (StageId, StageId)> + '_ {
        self.deps
            .iter()
            .flat_map(|(node, deps)| deps.iter().map(move |dep| (*dep, *node)))
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Nodes that depend directly on `id`
    pub fn successors(&self, id: StageId) -> Vec<StageId> {
        let mut successors: Vec<StageId> = self
            .deps
            .iter()
            .filter(|(_, deps)| deps.contains(&id))
            .map(|(node, _)| *node)
            .collect();
        successors.sort();
        successors
    }

    /// Execution-direction graph for petgraph algorithms
    pub fn to_graph_map(&self) -> DiGraphMap<StageId, ()> {
        let mut graph = DiGraphMap::new();
        for node in self.nodes() {
            graph.add_node(node);
        }
        for (dep, node) in self.relations() {
            graph.add_edge(dep, node, ());
        }
        graph
    }

    /// Whether making `target` depend on `source` would close a cycle
    pub fn would_create_cycle(&self, source: StageId, target: StageId) -> bool {
        if source == target {
            return true;
        }
        let graph = self.to_graph_map();
        graph.contains_node(target)
            && graph.contains_node(source)
            && has_path_connecting(&graph, target, source, None)
    }
}

impl FromIterator<(StageId, Vec<StageId>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (StageId, Vec<StageId>)>>(iter: I) -> Self {
        Self {
            deps: iter.into_iter().collect(),
        }
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        graph_equal(self, other)
    }
}

/// Flip dependency order into execution order
///
/// Every node of the input gets an entry, including nodes that only appear
/// as a dependency of others.
pub fn transpose(graph: &DependencyGraph) -> DependencyGraph {
    let mut out: HashMap<StageId, Vec<StageId>> = HashMap::new();

    for (node, deps) in &graph.deps {
        out.entry(*node).or_default();
        for dep in deps {
            out.entry(*dep).or_default().push(*node);
        }
    }

    DependencyGraph { deps: out }
}

/// Remove a node and re-link its dependents to its own dependencies
///
/// Returns `None` when `id` is not in the graph.
pub fn delete_node(id: StageId, graph: &DependencyGraph) -> Option<DependencyGraph> {
    let Some(inherited) = graph.deps.get(&id) else {
        tracing::warn!(stage = %id, "Cannot delete stage missing from dependency graph");
        return None;
    };

    let deps = graph
        .deps
        .iter()
        .filter(|(node, _)| **node != id)
        .map(|(node, deps)| {
            let mut kept: Vec<StageId> = deps.iter().copied().filter(|d| *d != id).collect();
            if deps.contains(&id) {
                for dep in inherited {
                    if *dep != *node && !kept.contains(dep) {
                        kept.push(*dep);
                    }
                }
            }
            (*node, kept)
        })
        .collect();

    Some(DependencyGraph { deps })
}

/// Compare graphs, treating each dependency list as a set
pub fn graph_equal(a: &DependencyGraph, b: &DependencyGraph) -> bool {
    if a.deps.len() != b.deps.len() {
        return false;
    }

    a.deps.iter().all(|(node, deps)| match b.deps.get(node) {
        Some(other) => {
            let mut left = deps.clone();
            let mut right = other.clone();
            left.sort();
            right.sort();
            left == right
        }
        None => false,
    })
}

/// Walk a single-chain graph from its head
///
/// Fails when the graph is not one chain covering every node: no head,
/// several heads, a branch, or a cycle.
pub fn execution_order(graph: &DependencyGraph) -> BuilderResult<Vec<StageId>> {
    if graph.is_empty() {
        return Ok(Vec::new());
    }

    let mut heads: Vec<StageId> = graph
        .deps
        .iter()
        .filter(|(_, deps)| deps.is_empty())
        .map(|(node, _)| *node)
        .collect();

    let head = match heads.len() {
        0 => return Err(BuilderError::malformed("every stage depends on another stage")),
        1 => heads.remove(0),
        n => {
            return Err(BuilderError::malformed(format!(
                "{} stages have no dependencies, expected exactly one",
                n
            )))
        }
    };

    let execution = transpose(graph);
    let mut order = vec![head];
    let mut visited = HashSet::from([head]);
    let mut current = head;

    loop {
        let next = execution.dependencies(current);
        match next {
            [] => break,
            [only] => {
                if !visited.insert(*only) {
                    return Err(BuilderError::malformed("stage dependencies form a cycle"));
                }
                order.push(*only);
                current = *only;
            }
            _ => {
                return Err(BuilderError::malformed(format!(
                    "{} stages depend on the same stage",
                    next.len()
                )))
            }
        }
    }

    if order.len() != graph.len() {
        return Err(BuilderError::malformed(format!(
            "{} of {} stages are not reachable from the first stage",
            graph.len() - order.len(),
            graph.len()
        )));
    }

    Ok(order)
}

/// Stages with their document keys, in execution order
pub fn ordered_sequence<'a>(
    graph: &DependencyGraph,
    stage_data: &'a HashMap<StageId, Stage>,
) -> BuilderResult<Vec<(String, &'a Stage)>> {
    execution_order(graph)?
        .into_iter()
        .map(|id| {
            stage_data
                .get(&id)
                .map(|stage| (stage.key(), stage))
                .ok_or_else(|| BuilderError::malformed(format!("stage {} has no configuration", id)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::lookup;

    fn ids(n: usize) -> Vec<StageId> {
        (0..n).map(|_| StageId::new()).collect()
    }

    fn chain(ids: &[StageId]) -> DependencyGraph {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (*id, if i == 0 { vec![] } else { vec![ids[i - 1]] }))
            .collect()
    }

    #[test]
    fn test_transpose_includes_dependency_only_nodes() {
        let n = ids(2);
        let graph: DependencyGraph = [(n[1], vec![n[0]])].into_iter().collect();

        let t = transpose(&graph);
        assert_eq!(t.dependencies(n[0]), &[n[1]]);
        assert!(t.contains(n[1]));
        assert!(t.dependencies(n[1]).is_empty());
    }

    #[test]
    fn test_transpose_involution() {
        let n = ids(4);
        let diamond: DependencyGraph = [
            (n[0], vec![]),
            (n[1], vec![n[0]]),
            (n[2], vec![n[0]]),
            (n[3], vec![n[1], n[2]]),
        ]
        .into_iter()
        .collect();

        assert_eq!(transpose(&transpose(&diamond)), diamond);
        assert_eq!(transpose(&transpose(&chain(&n))), chain(&n));
    }

    #[test]
    fn test_equality_ignores_dependency_order() {
        let n = ids(3);
        let a: DependencyGraph = [(n[0], vec![]), (n[1], vec![]), (n[2], vec![n[0], n[1]])]
            .into_iter()
            .collect();
        let b: DependencyGraph = [(n[0], vec![]), (n[1], vec![]), (n[2], vec![n[1], n[0]])]
            .into_iter()
            .collect();
        let c: DependencyGraph = [(n[0], vec![]), (n[1], vec![]), (n[2], vec![n[1]])]
            .into_iter()
            .collect();

        assert!(graph_equal(&a, &b));
        assert!(!graph_equal(&a, &c));
    }

    #[test]
    fn test_delete_relinks_chain() {
        let n = ids(3);
        let graph = delete_node(n[1], &chain(&n)).unwrap();

        assert!(!graph.contains(n[1]));
        assert_eq!(graph.dependencies(n[2]), &[n[0]]);
        assert!(graph.relations().all(|(dep, node)| dep != n[1] && node != n[1]));
    }

    #[test]
    fn test_delete_head_and_tail() {
        let n = ids(3);
        let without_head = delete_node(n[0], &chain(&n)).unwrap();
        assert!(without_head.dependencies(n[1]).is_empty());

        let without_tail = delete_node(n[2], &chain(&n)).unwrap();
        assert_eq!(without_tail.len(), 2);
        assert_eq!(without_tail.dependencies(n[1]), &[n[0]]);
    }

    #[test]
    fn test_delete_never_leaves_id() {
        let n = ids(4);
        let diamond: DependencyGraph = [
            (n[0], vec![]),
            (n[1], vec![n[0]]),
            (n[2], vec![n[0]]),
            (n[3], vec![n[1], n[2]]),
        ]
        .into_iter()
        .collect();

        for id in &n {
            let graph = delete_node(*id, &diamond).unwrap();
            assert!(!graph.contains(*id));
            assert!(graph.relations().all(|(dep, node)| dep != *id && node != *id));
        }
    }

    #[test]
    fn test_delete_missing_is_none() {
        let n = ids(2);
        assert!(delete_node(StageId::new(), &chain(&n)).is_none());
    }

    #[test]
    fn test_execution_order_chain() {
        let n = ids(4);
        assert_eq!(execution_order(&chain(&n)).unwrap(), n);
        assert!(execution_order(&DependencyGraph::new()).unwrap().is_empty());
    }

    #[test]
    fn test_execution_order_rejects_disconnected_stage() {
        let n = ids(3);
        let mut graph = chain(&n[..2]);
        graph.insert_node(n[2]);

        let err = execution_order(&graph).unwrap_err();
        assert!(matches!(err, BuilderError::MalformedGraph { .. }));
    }

    #[test]
    fn test_execution_order_rejects_branch_and_cycle() {
        let n = ids(3);
        let branch: DependencyGraph = [(n[0], vec![]), (n[1], vec![n[0]]), (n[2], vec![n[0]])]
            .into_iter()
            .collect();
        assert!(execution_order(&branch).is_err());

        let cycle: DependencyGraph = [(n[0], vec![n[1]]), (n[1], vec![n[0]])].into_iter().collect();
        assert!(execution_order(&cycle).is_err());

        let tail_cycle: DependencyGraph =
            [(n[0], vec![]), (n[1], vec![n[0], n[2]]), (n[2], vec![n[1]])]
                .into_iter()
                .collect();
        assert!(execution_order(&tail_cycle).is_err());
    }

    #[test]
    fn test_ordered_sequence_keys() {
        let n = ids(3);
        let mut data = HashMap::new();
        data.insert(n[0], Stage::new(lookup("DiffWithSkeleton").unwrap()));
        data.insert(n[1], Stage::new(lookup("FileStructureValidation").unwrap()));
        let mut compile = Stage::new(lookup("Compile").unwrap());
        compile.label = "all".into();
        data.insert(n[2], compile);

        let keys: Vec<String> = ordered_sequence(&chain(&n), &data)
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["diffWithSkeleton", "fileStructureValidation", "compile:all"]);
    }

    #[test]
    fn test_would_create_cycle() {
        let n = ids(3);
        let graph = chain(&n);
        assert!(graph.would_create_cycle(n[2], n[0]));
        assert!(graph.would_create_cycle(n[1], n[1]));
        assert!(!graph.would_create_cycle(n[0], n[2]));
    }

    #[test]
    fn test_successors() {
        let n = ids(3);
        let graph = chain(&n);
        assert_eq!(graph.successors(n[0]), vec![n[1]]);
        assert!(graph.successors(n[2]).is_empty());
    }
}
