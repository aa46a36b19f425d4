use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Undirected adjacency between nodes, kept symmetric by construction.
///
/// Every node known to the graph has an entry, possibly with no neighbors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyGraph {
    edges: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl AdjacencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node with no neighbors if it is not known yet.
    pub fn ensure_node(&mut self, id: NodeId) {
        self.edges.entry(id).or_default();
    }

    /// Adds the edge `a — b` in both directions. Self-loops are ignored.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    /// Returns `true` if `b` is a neighbor of `a`.
    #[must_use]
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Neighbors of `id` in id order; empty for unknown nodes.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.get(&id).into_iter().flatten().copied()
    }

    /// Number of neighbors of `id`.
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.get(&id).map_or(0, BTreeSet::len)
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Number of nodes with an entry.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Ids of all nodes with an entry.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.keys().copied()
    }

    /// Drops a node and every edge that touches it.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(neighbors) = self.edges.remove(&id) {
            for other in neighbors {
                if let Some(set) = self.edges.get_mut(&other) {
                    set.remove(&id);
                }
            }
        }
    }

    /// Returns the first edge whose reverse is missing, if any.
    #[must_use]
    pub fn asymmetric_edge(&self) -> Option<(NodeId, NodeId)> {
        self.edges.iter().find_map(|(&a, neighbors)| {
            neighbors
                .iter()
                .find(|&&b| !self.contains_edge(b, a))
                .map(|&b| (a, b))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_symmetric() {
        let (a, b, c) = (NodeId::new_v4(), NodeId::new_v4(), NodeId::new_v4());
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.ensure_node(c);
        assert!(graph.contains_edge(a, b));
        assert!(graph.contains_edge(b, a));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.degree(c), 0);
        assert!(graph.asymmetric_edge().is_none());
    }

    #[test]
    fn self_loops_are_ignored() {
        let a = NodeId::new_v4();
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(a, a);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn removing_a_node_drops_its_edges() {
        let (a, b, c) = (NodeId::new_v4(), NodeId::new_v4(), NodeId::new_v4());
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(a, c);
        graph.remove_node(a);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.neighbors(b).count(), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn serializes_as_id_to_neighbor_list() {
        let (a, b) = (NodeId::new_v4(), NodeId::new_v4());
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(a, b);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json[a.to_string()][0], b.to_string());
        let back: AdjacencyGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back, graph);
    }
}
