mod adjacency;
mod resolve;
mod split;
mod zones;

pub use adjacency::BuildAdjacency;
pub use resolve::{resolve_pair, Resolution, ResolveIntersections};
pub use split::{segment_count, split_polygon, SplitAxis, SplitNode, SplitOversized, SplitReport};
pub use zones::TagZones;

use std::fmt;

use crate::error::GeometryError;
use crate::registry::NodeId;

/// Pipeline step that produced a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Resolve,
    Split,
    Adjacency,
    ZoneTagging,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolve => "intersection resolution",
            Self::Split => "splitting",
            Self::Adjacency => "adjacency",
            Self::ZoneTagging => "zone tagging",
        })
    }
}

/// A per-item geometric failure. The item is skipped; the build goes on.
#[derive(Debug)]
pub struct BuildFailure {
    pub stage: BuildStage,
    /// Nodes involved, in registry order.
    pub nodes: Vec<NodeId>,
    /// Zone involved, for zone tagging failures.
    pub zone: Option<String>,
    pub error: GeometryError,
}

impl BuildFailure {
    #[must_use]
    pub fn new(stage: BuildStage, nodes: Vec<NodeId>, error: GeometryError) -> Self {
        Self {
            stage,
            nodes,
            zone: None,
            error,
        }
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed for", self.stage)?;
        for id in &self.nodes {
            write!(f, " {id}")?;
        }
        if let Some(zone) = &self.zone {
            write!(f, " in zone {zone}")?;
        }
        write!(f, ": {}", self.error)
    }
}
