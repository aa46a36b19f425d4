use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Polygon;

slotmap::new_key_type! {
    /// Arena slot of a node in the registry.
    pub struct NodeKey;
}

/// Stable external identifier of a node. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the textual form of an id.
    ///
    /// # Errors
    ///
    /// Returns the `uuid` parse error for malformed text.
    pub fn parse(text: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(text).map(Self)
    }
}

impl From<Uuid> for NodeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-form classification of a node: one tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeType {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(tag) => f.write_str(tag),
            Self::Many(tags) => f.write_str(&tags.join(", ")),
        }
    }
}

/// Collaborator-editable labels of a node.
///
/// Empty strings are treated as "unset", as the attribute editor submits them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    pub custom_id: Option<String>,
    pub name: Option<String>,
    pub node_type: Option<NodeType>,
}

impl NodeAttributes {
    /// Builds attributes from raw text fields, mapping empty input to `None`.
    #[must_use]
    pub fn from_text(custom_id: Option<&str>, name: Option<&str>, node_type: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        Self {
            custom_id: clean(custom_id),
            name: clean(name),
            node_type: clean(node_type).map(NodeType::One),
        }
    }

    /// Clears empty labels.
    #[must_use]
    pub(crate) fn normalized(self) -> Self {
        let keep = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        let node_type = match self.node_type {
            Some(NodeType::One(tag)) => keep(Some(tag)).map(NodeType::One),
            Some(NodeType::Many(tags)) => {
                let tags: Vec<String> = tags.into_iter().filter(|t| !t.trim().is_empty()).collect();
                (!tags.is_empty()).then_some(NodeType::Many(tags))
            }
            None => None,
        };
        Self {
            custom_id: keep(self.custom_id),
            name: keep(self.name),
            node_type,
        }
    }
}

/// A polygonal cell of the store graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable identifier, assigned at creation.
    pub id: NodeId,
    /// The cell outline, owned exclusively by this node.
    pub polygon: Polygon,
    /// Optional external code.
    pub custom_id: Option<String>,
    /// Optional label.
    pub name: Option<String>,
    /// Optional classification.
    pub node_type: Option<NodeType>,
    /// Ids of the zones this node touches, without duplicates.
    pub zones: Vec<String>,
    /// Set once the node is a split product; it is never split again.
    pub already_split: bool,
}

impl Node {
    /// A freshly drawn node with a new id and no attributes.
    #[must_use]
    pub fn new(polygon: Polygon) -> Self {
        Self {
            id: NodeId::new_v4(),
            polygon,
            custom_id: None,
            name: None,
            node_type: None,
            zones: Vec::new(),
            already_split: false,
        }
    }

    /// A split product of `parent`: new id, inherited labels, no zones.
    #[must_use]
    pub fn child_of(parent: &Node, polygon: Polygon) -> Self {
        Self {
            id: NodeId::new_v4(),
            polygon,
            custom_id: parent.custom_id.clone(),
            name: parent.name.clone(),
            node_type: parent.node_type.clone(),
            zones: Vec::new(),
            already_split: true,
        }
    }

    /// Overwrites the labels of this node.
    pub fn set_attributes(&mut self, attributes: NodeAttributes) {
        let attributes = attributes.normalized();
        self.custom_id = attributes.custom_id;
        self.name = attributes.name;
        self.node_type = attributes.node_type;
    }

    /// Records zone membership; returns `false` if it was already recorded.
    pub fn add_zone(&mut self, zone_id: &str) -> bool {
        if self.zones.iter().any(|z| z == zone_id) {
            return false;
        }
        self.zones.push(zone_id.to_owned());
        true
    }
}
