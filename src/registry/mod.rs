pub mod adjacency;
pub mod node;

pub use adjacency::AdjacencyGraph;
pub use node::{Node, NodeAttributes, NodeId, NodeKey, NodeType};

use std::collections::{HashMap, HashSet};

use crate::error::{RegistryError, ValidationError};
use slotmap::SlotMap;

/// Central arena that owns every node and the adjacency between them.
///
/// Nodes are addressed by arena keys internally and by [`NodeId`] from the
/// outside. Iteration follows insertion order, so pipeline runs are
/// deterministic. Removal during a pipeline phase is deferred: a retired node
/// disappears from iteration at once but stays in the arena until
/// [`NodeRegistry::compact`] runs between phases.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: SlotMap<NodeKey, Node>,
    order: Vec<NodeKey>,
    index: HashMap<NodeId, NodeKey>,
    retired: HashSet<NodeKey>,
    adjacency: AdjacencyGraph,
}

impl NodeRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node and returns its key.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DuplicateNode` if a node with the same id
    /// is already present.
    pub fn insert(&mut self, node: Node) -> Result<NodeKey, ValidationError> {
        if self.index.contains_key(&node.id) {
            return Err(ValidationError::DuplicateNode(node.id.to_string()));
        }
        let id = node.id;
        let key = self.nodes.insert(node);
        self.order.push(key);
        self.index.insert(id, key);
        Ok(key)
    }

    /// Returns a reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not address a live node.
    pub fn node(&self, key: NodeKey) -> Result<&Node, RegistryError> {
        self.nodes
            .get(key)
            .filter(|_| !self.retired.contains(&key))
            .ok_or_else(|| RegistryError::Inconsistent("dangling node key".into()))
    }

    /// Returns a mutable reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not address a live node.
    pub fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node, RegistryError> {
        if self.retired.contains(&key) {
            return Err(RegistryError::Inconsistent("node key was retired".into()));
        }
        self.nodes
            .get_mut(key)
            .ok_or_else(|| RegistryError::Inconsistent("dangling node key".into()))
    }

    /// Looks up the arena key of a live node.
    #[must_use]
    pub fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.index
            .get(&id)
            .copied()
            .filter(|key| !self.retired.contains(key))
    }

    /// Returns the node with the given id.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no live node has this id.
    pub fn get(&self, id: NodeId) -> Result<&Node, ValidationError> {
        self.key_of(id)
            .and_then(|key| self.nodes.get(key))
            .ok_or_else(|| ValidationError::UnknownNode(id.to_string()))
    }

    /// Returns the node with the given id for mutation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no live node has this id.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, ValidationError> {
        let key = self
            .key_of(id)
            .ok_or_else(|| ValidationError::UnknownNode(id.to_string()))?;
        self.nodes
            .get_mut(key)
            .ok_or_else(|| ValidationError::UnknownNode(id.to_string()))
    }

    /// Keys of live nodes in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<NodeKey> {
        self.order
            .iter()
            .copied()
            .filter(|key| !self.retired.contains(key))
            .collect()
    }

    /// Live nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order
            .iter()
            .filter(|key| !self.retired.contains(key))
            .filter_map(|&key| self.nodes.get(key))
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len() - self.retired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hides a node from iteration until the next [`compact`](Self::compact).
    pub fn retire(&mut self, key: NodeKey) {
        if self.nodes.contains_key(key) {
            self.retired.insert(key);
        }
    }

    /// Number of retired nodes awaiting compaction.
    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.retired.len()
    }

    /// Physically drops every retired node and its adjacency entries.
    ///
    /// Returns the number of nodes removed.
    pub fn compact(&mut self) -> usize {
        if self.retired.is_empty() {
            return 0;
        }
        let retired = std::mem::take(&mut self.retired);
        self.order.retain(|key| !retired.contains(key));
        for key in &retired {
            if let Some(node) = self.nodes.remove(*key) {
                self.index.remove(&node.id);
                self.adjacency.remove_node(node.id);
            }
        }
        retired.len()
    }

    /// Removes a node immediately.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no live node has this id.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, ValidationError> {
        let key = self
            .key_of(id)
            .ok_or_else(|| ValidationError::UnknownNode(id.to_string()))?;
        self.order.retain(|k| *k != key);
        self.index.remove(&id);
        self.adjacency.remove_node(id);
        self.nodes
            .remove(key)
            .ok_or_else(|| ValidationError::UnknownNode(id.to_string()))
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    pub fn adjacency_mut(&mut self) -> &mut AdjacencyGraph {
        &mut self.adjacency
    }

    /// Replaces the adjacency wholesale.
    pub fn set_adjacency(&mut self, adjacency: AdjacencyGraph) {
        self.adjacency = adjacency;
    }

    /// Verifies that order, arena, id index and adjacency agree.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Inconsistent` describing the first violation.
    pub fn check_consistency(&self) -> Result<(), RegistryError> {
        let inconsistent =
            |msg: String| -> Result<(), RegistryError> { Err(RegistryError::Inconsistent(msg)) };

        if self.order.len() != self.nodes.len() || self.index.len() != self.nodes.len() {
            return inconsistent(format!(
                "{} ordered keys, {} indexed ids, {} stored nodes",
                self.order.len(),
                self.index.len(),
                self.nodes.len()
            ));
        }
        let mut seen = HashSet::with_capacity(self.order.len());
        for &key in &self.order {
            if !seen.insert(key) {
                return inconsistent("node listed twice in iteration order".into());
            }
            let Some(node) = self.nodes.get(key) else {
                return inconsistent("iteration order references a missing node".into());
            };
            if self.index.get(&node.id) != Some(&key) {
                return inconsistent(format!("id index out of date for node {}", node.id));
            }
        }
        if let Some(id) = self.adjacency.node_ids().find(|id| self.key_of(*id).is_none()) {
            return inconsistent(format!("adjacency references unknown node {id}"));
        }
        if let Some((a, b)) = self.adjacency.asymmetric_edge() {
            return inconsistent(format!("edge {a} -> {b} has no reverse"));
        }
        Ok(())
    }
}
