use tracing::{debug, warn};

use super::{BuildFailure, BuildStage};
use crate::error::Result;
use crate::kernel::GeometryKernel;
use crate::registry::{AdjacencyGraph, NodeRegistry};

/// Recomputes the adjacency relation from the current polygons.
///
/// Two nodes are adjacent when their outlines overlap or run along each
/// other. Every live node gets an entry, isolated ones included. The previous
/// relation is discarded.
pub struct BuildAdjacency<'k> {
    kernel: &'k dyn GeometryKernel,
}

impl<'k> BuildAdjacency<'k> {
    /// Creates a new `BuildAdjacency` operation.
    #[must_use]
    pub fn new(kernel: &'k dyn GeometryKernel) -> Self {
        Self { kernel }
    }

    /// Executes the rebuild, returning pairs that could not be tested.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is inconsistent.
    pub fn execute(&self, registry: &mut NodeRegistry) -> Result<Vec<BuildFailure>> {
        let keys = registry.keys();
        let mut graph = AdjacencyGraph::new();
        let mut failures = Vec::new();

        for (i, &key_a) in keys.iter().enumerate() {
            let a = registry.node(key_a)?;
            graph.ensure_node(a.id);
            for &key_b in &keys[i + 1..] {
                let b = registry.node(key_b)?;
                match self.kernel.borders(&a.polygon, &b.polygon) {
                    Ok(true) => graph.add_edge(a.id, b.id),
                    Ok(false) => {}
                    Err(error) => {
                        warn!(id_a = %a.id, id_b = %b.id, %error, "adjacency test failed");
                        failures.push(BuildFailure::new(BuildStage::Adjacency, vec![a.id, b.id], error));
                    }
                }
            }
        }

        debug!(nodes = graph.node_count(), edges = graph.edge_count(), "built adjacency");
        registry.set_adjacency(graph);
        Ok(failures)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::kernel::ClippingKernel;
    use crate::registry::{Node, NodeId};

    fn insert(registry: &mut NodeRegistry, polygon: Polygon) -> NodeId {
        let node = Node::new(polygon);
        let id = node.id;
        registry.insert(node).unwrap();
        id
    }

    #[test]
    fn shared_edges_become_symmetric_edges() {
        let kernel = ClippingKernel::new();
        let mut registry = NodeRegistry::new();
        let a = insert(&mut registry, Polygon::rectangle(0.0, 0.0, 1.0, 1.0));
        let b = insert(&mut registry, Polygon::rectangle(1.0, 0.0, 2.0, 1.0));
        let c = insert(&mut registry, Polygon::rectangle(2.0, 1.0, 3.0, 2.0));
        let d = insert(&mut registry, Polygon::rectangle(9.0, 9.0, 10.0, 10.0));

        let failures = BuildAdjacency::new(&kernel).execute(&mut registry).unwrap();
        assert!(failures.is_empty());

        let graph = registry.adjacency();
        assert!(graph.contains_edge(a, b));
        assert!(graph.contains_edge(b, a));
        // b and c only meet at a corner.
        assert!(!graph.contains_edge(b, c));
        assert_eq!(graph.degree(d), 0);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 1);
        registry.check_consistency().unwrap();
    }

    #[test]
    fn stale_edges_are_dropped() {
        let kernel = ClippingKernel::new();
        let mut registry = NodeRegistry::new();
        let a = insert(&mut registry, Polygon::rectangle(0.0, 0.0, 1.0, 1.0));
        let b = insert(&mut registry, Polygon::rectangle(5.0, 0.0, 6.0, 1.0));
        registry.adjacency_mut().add_edge(a, b);

        BuildAdjacency::new(&kernel).execute(&mut registry).unwrap();
        assert!(!registry.adjacency().contains_edge(a, b));
    }
}
