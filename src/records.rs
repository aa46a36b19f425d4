//! Serialization contract shared with the drawing front end.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ParseError;
use crate::geometry::wkt::{format_polygon, parse_polygon};
use crate::registry::{Node, NodeId, NodeType};

/// Exported form of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    /// Outline as scaled polygon text.
    #[serde(alias = "wkt")]
    pub boundary: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
    #[serde(default, deserialize_with = "loose_ids")]
    pub zones: Vec<String>,
    #[serde(default, alias = "already_splitted")]
    pub already_split: bool,
}

impl NodeRecord {
    /// Captures a node, scaling its outline by `scale`.
    #[must_use]
    pub fn from_node(node: &Node, scale: f64) -> Self {
        Self {
            id: node.id,
            boundary: format_polygon(&node.polygon, scale),
            name: node.name.clone(),
            custom_id: node.custom_id.clone(),
            node_type: node.node_type.clone(),
            zones: node.zones.clone(),
            already_split: node.already_split,
        }
    }

    /// Rebuilds the node, dividing the outline by `scale`.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the boundary text is malformed.
    pub fn to_node(&self, scale: f64) -> Result<Node, ParseError> {
        Ok(Node {
            id: self.id,
            polygon: parse_polygon(&self.boundary, scale)?,
            custom_id: self.custom_id.clone(),
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            zones: self.zones.clone(),
            already_split: self.already_split,
        })
    }
}

/// Exported form of the whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub shapes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: BTreeMap<NodeId, Vec<NodeId>>,
}

impl GraphRecord {
    /// Parses an exported graph.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload does not match the record shape.
    pub fn from_json_str(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON, as shown in the export dialog.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reference zone as provided by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    #[serde(deserialize_with = "loose_id")]
    pub zone_id: String,
    pub wkt: String,
    #[serde(rename = "type")]
    pub zone_type: String,
}

/// Exported form of a rectangle in the rectangle-only editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleRecord {
    /// Missing on hand-written input; a fresh id is assigned on import.
    #[serde(default)]
    pub uuid: Option<NodeId>,
    pub wkt: String,
    #[serde(default)]
    pub name: Option<String>,
    /// The collaborator's custom code.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
}

/// A single record or a list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Identifiers that arrive either as strings or as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Number(i64),
}

impl From<LooseId> for String {
    fn from(value: LooseId) -> Self {
        match value {
            LooseId::Text(text) => text,
            LooseId::Number(n) => n.to_string(),
        }
    }
}

fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    LooseId::deserialize(deserializer).map(String::from)
}

fn loose_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<LooseId>::deserialize(deserializer).map(|ids| ids.into_iter().map(String::from).collect())
}
