// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Layered top-to-bottom layout
//!
//! Ranks come from the longest path to each node. Weakly connected
//! components are laid out independently and placed side by side in the
//! order their first node appears, so disconnected stages never overlap a
//! chain.

use petgraph::algo::toposort;
use petgraph::graphmap::{DiGraphMap, UnGraphMap};
use petgraph::visit::Bfs;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::Position;
use crate::stages::StageId;

pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 60.0;
/// Horizontal gap between nodes of one rank
pub const NODE_SEP: f64 = 50.0;
/// Vertical gap between ranks
pub const RANK_SEP: f64 = 70.0;

/// Compute positions for `nodes` connected by `(source, target)` edges
///
/// Returns `None` when there are no edges or the edges contain a cycle; the
/// caller keeps the current positions in both cases.
pub fn layered_positions(
    nodes: &[StageId],
    edges: &[(StageId, StageId)],
) -> Option<HashMap<StageId, Position>> {
    if edges.is_empty() {
        return None;
    }

    let mut directed: DiGraphMap<StageId, ()> = DiGraphMap::new();
    let mut undirected: UnGraphMap<StageId, ()> = UnGraphMap::new();
    for node in nodes {
        directed.add_node(*node);
        undirected.add_node(*node);
    }
    for (source, target) in edges {
        directed.add_edge(*source, *target, ());
        undirected.add_edge(*source, *target, ());
    }

    let order = match toposort(&directed, None) {
        Ok(order) => order,
        Err(cycle) => {
            tracing::warn!(stage = %cycle.node_id(), "Cycle in stage graph, layout skipped");
            return None;
        }
    };

    let mut ranks: HashMap<StageId, usize> = HashMap::new();
    for node in order {
        let rank = directed
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .filter_map(|pred| ranks.get(&pred).map(|r| r + 1))
            .max()
            .unwrap_or(0);
        ranks.insert(node, rank);
    }

    let mut positions = HashMap::new();
    let mut visited: HashSet<StageId> = HashSet::new();
    let mut offset = 0.0;

    for &start in nodes {
        if visited.contains(&start) {
            continue;
        }

        let mut members = HashSet::new();
        let mut bfs = Bfs::new(&undirected, start);
        while let Some(node) = bfs.next(&undirected) {
            members.insert(node);
        }
        visited.extend(members.iter().copied());

        // Rows keep the caller's node order within each rank
        let mut rows: BTreeMap<usize, Vec<StageId>> = BTreeMap::new();
        for node in nodes.iter().filter(|n| members.contains(n)) {
            rows.entry(ranks[node]).or_default().push(*node);
        }

        let widest = rows.values().map(Vec::len).max().unwrap_or(1);
        let width = row_width(widest);

        for (rank, row) in &rows {
            let left = offset + (width - row_width(row.len())) / 2.0;
            for (i, node) in row.iter().enumerate() {
                positions.insert(
                    *node,
                    Position {
                        x: left + i as f64 * (NODE_WIDTH + NODE_SEP),
                        y: *rank as f64 * (NODE_HEIGHT + RANK_SEP),
                    },
                );
            }
        }

        offset += width + NODE_SEP;
    }

    Some(positions)
}

fn row_width(count: usize) -> f64 {
    count as f64 * NODE_WIDTH + count.saturating_sub(1) as f64 * NODE_SEP
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<StageId> {
        (0..n).map(|_| StageId::new()).collect()
    }

    #[test]
    fn test_no_edges_is_noop() {
        assert!(layered_positions(&ids(3), &[]).is_none());
    }

    #[test]
    fn test_chain_stacks_vertically() {
        let n = ids(3);
        let positions = layered_positions(&n, &[(n[0], n[1]), (n[1], n[2])]).unwrap();

        assert_eq!(positions[&n[0]].y, 0.0);
        assert_eq!(positions[&n[1]].y, NODE_HEIGHT + RANK_SEP);
        assert_eq!(positions[&n[2]].y, 2.0 * (NODE_HEIGHT + RANK_SEP));
        assert_eq!(positions[&n[0]].x, positions[&n[2]].x);
    }

    #[test]
    fn test_longest_path_rank() {
        let n = ids(3);
        // n0 -> n1 -> n2 and n0 -> n2: n2 sits below n1
        let edges = [(n[0], n[1]), (n[1], n[2]), (n[0], n[2])];
        let positions = layered_positions(&n, &edges).unwrap();
        assert!(positions[&n[2]].y > positions[&n[1]].y);
    }

    #[test]
    fn test_components_do_not_overlap() {
        let n = ids(4);
        let positions = layered_positions(&n, &[(n[0], n[1])]).unwrap();

        assert_eq!(positions.len(), 4);
        let mut xs: Vec<f64> = [n[0], n[2], n[3]].iter().map(|id| positions[id].x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= NODE_WIDTH);
        }
    }

    #[test]
    fn test_cycle_skips_layout() {
        let n = ids(2);
        assert!(layered_positions(&n, &[(n[0], n[1]), (n[1], n[0])]).is_none());
    }
}
