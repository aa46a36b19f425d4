//! The command surface consumed by the drawing front end.

use tracing::{debug, error, info, warn};

use crate::config::GraphConfig;
use crate::error::{Result, StoreGraphError, ValidationError};
use crate::geometry::Polygon;
use crate::kernel::{ClippingKernel, GeometryKernel};
use crate::operations::{BuildAdjacency, BuildFailure, ResolveIntersections, SplitOversized, TagZones};
use crate::records::{GraphRecord, NodeRecord, ZoneRecord};
use crate::registry::{AdjacencyGraph, Node, NodeAttributes, NodeId, NodeRegistry};
use crate::session::{Mode, Session};
use crate::zone::Zone;

/// Result of a successful graph build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub adjacency: AdjacencyGraph,
    /// Items skipped because of a geometric failure.
    pub failures: Vec<BuildFailure>,
}

/// A record or edge list entry that could not be imported.
#[derive(Debug)]
pub struct ImportFailure {
    /// Position in the `shapes` list, or `None` for an edge entry.
    pub index: Option<usize>,
    pub error: StoreGraphError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<NodeId>,
    pub failures: Vec<ImportFailure>,
}

/// A collaborator request.
#[derive(Debug, Clone)]
pub enum Command {
    AddNode(Polygon),
    DeleteNode(NodeId),
    EditNodeAttributes {
        id: NodeId,
        attributes: NodeAttributes,
    },
    ReshapeNode {
        id: NodeId,
        polygon: Polygon,
    },
    UndoLastDrawing,
    Clear,
    BuildGraph,
    ExportGraph,
    ImportGraph(GraphRecord),
    TagZones(Vec<ZoneRecord>),
}

#[derive(Debug)]
pub enum CommandOutput {
    Added(NodeId),
    Deleted(Node),
    Undone(Option<NodeId>),
    Built(BuildOutcome),
    Exported(GraphRecord),
    Imported(ImportReport),
    Tagged(Vec<BuildFailure>),
    Done,
}

/// Owns the nodes, the reference zones and the kernel, and runs the pipeline.
pub struct StoreLayout {
    config: GraphConfig,
    kernel: Box<dyn GeometryKernel>,
    registry: NodeRegistry,
    zones: Vec<Zone>,
    history: Vec<NodeId>,
}

impl StoreLayout {
    /// Creates an empty layout backed by the clipping kernel.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the config is unusable.
    pub fn new(config: GraphConfig) -> Result<Self> {
        Self::with_kernel(config, Box::new(ClippingKernel::new()))
    }

    /// Creates an empty layout backed by `kernel`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the config is unusable.
    pub fn with_kernel(config: GraphConfig, kernel: Box<dyn GeometryKernel>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            kernel,
            registry: NodeRegistry::new(),
            zones: Vec::new(),
            history: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Looks up a node.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no node has this id.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        Ok(self.registry.get(id)?)
    }

    /// Adds a freshly drawn node.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside draw mode.
    pub fn add_node(&mut self, session: &Session, polygon: Polygon) -> Result<NodeId> {
        session.require(Mode::Draw, "addNode")?;
        let node = Node::new(polygon);
        let id = node.id;
        self.registry.insert(node)?;
        self.history.push(id);
        debug!(node = %id, "added node");
        Ok(id)
    }

    /// Deletes a node and its edges.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no node has this id.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node> {
        let node = self.registry.remove(id)?;
        self.history.retain(|drawn| *drawn != id);
        debug!(node = %id, "deleted node");
        Ok(node)
    }

    /// Overwrites the labels of a node. Empty strings clear a label.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no node has this id.
    pub fn edit_node_attributes(&mut self, id: NodeId, attributes: NodeAttributes) -> Result<()> {
        self.registry.get_mut(id)?.set_attributes(attributes);
        Ok(())
    }

    /// Replaces the outline of a node.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside edit mode, or
    /// `ValidationError::UnknownNode` if no node has this id.
    pub fn reshape_node(&mut self, session: &Session, id: NodeId, polygon: Polygon) -> Result<()> {
        session.require(Mode::Edit, "reshapeNode")?;
        self.registry.get_mut(id)?.polygon = polygon;
        Ok(())
    }

    /// Deletes the most recently drawn node that still exists.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside draw mode.
    pub fn undo_last_drawing(&mut self, session: &Session) -> Result<Option<NodeId>> {
        session.require(Mode::Draw, "undoLastDrawing")?;
        while let Some(id) = self.history.pop() {
            if self.registry.remove(id).is_ok() {
                debug!(node = %id, "undid drawing");
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Removes every node and edge. Reference zones are kept.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.history.clear();
    }

    /// Runs the full pipeline: resolve overlaps, split oversized nodes,
    /// rebuild adjacency, tag zones.
    ///
    /// Per-item geometric failures are skipped and reported in the outcome.
    /// If the registry loses consistency the build is rolled back.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Inconsistent` after rolling back.
    pub fn build_graph(&mut self) -> Result<BuildOutcome> {
        let snapshot = self.registry.clone();
        match self.run_pipeline() {
            Ok(outcome) => {
                self.history.clear();
                Ok(outcome)
            }
            Err(err) => {
                error!(%err, "graph build failed, restoring previous state");
                self.registry = snapshot;
                Err(err)
            }
        }
    }

    fn run_pipeline(&mut self) -> Result<BuildOutcome> {
        let kernel = self.kernel.as_ref();
        let registry = &mut self.registry;
        info!(nodes = registry.len(), zones = self.zones.len(), "building graph");

        let mut failures = ResolveIntersections::new(kernel).execute(registry)?;
        registry.check_consistency()?;

        let split = SplitOversized::new(kernel, self.config.max_segment_length).execute(registry)?;
        failures.extend(split.failures);
        let removed = registry.compact();
        registry.check_consistency()?;
        debug!(replaced = split.replaced, created = split.created.len(), removed, "split phase done");

        failures.extend(BuildAdjacency::new(kernel).execute(registry)?);
        registry.check_consistency()?;

        failures.extend(TagZones::new(kernel, &self.zones).execute(registry)?);
        registry.check_consistency()?;

        let adjacency = registry.adjacency().clone();
        info!(
            nodes = registry.len(),
            edges = adjacency.edge_count(),
            failures = failures.len(),
            "graph built"
        );
        Ok(BuildOutcome { adjacency, failures })
    }

    /// Replaces the reference zones and tags every node with them.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is inconsistent.
    pub fn tag_zones(&mut self, zones: Vec<Zone>) -> Result<Vec<BuildFailure>> {
        self.zones = zones;
        let failures = TagZones::new(self.kernel.as_ref(), &self.zones).execute(&mut self.registry)?;
        self.registry.check_consistency()?;
        Ok(failures)
    }

    /// Decodes zone records with the configured scale factor.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` for the first malformed record.
    pub fn zones_from_records(&self, records: &[ZoneRecord]) -> Result<Vec<Zone>> {
        let scale = self.config.scale();
        records
            .iter()
            .map(|record| Zone::from_record(record, scale).map_err(StoreGraphError::from))
            .collect()
    }

    /// Captures every node and the adjacency, in registry order.
    #[must_use]
    pub fn export_graph(&self) -> GraphRecord {
        let scale = self.config.scale();
        let adjacency = self.registry.adjacency();
        GraphRecord {
            shapes: self
                .registry
                .iter()
                .map(|node| NodeRecord::from_node(node, scale))
                .collect(),
            edges: self
                .registry
                .iter()
                .map(|node| (node.id, adjacency.neighbors(node.id).collect()))
                .collect(),
        }
    }

    /// Adds the nodes and edges of an exported graph.
    ///
    /// Records that fail to parse or reuse an existing id are skipped and
    /// reported. Edges are kept only between known nodes.
    pub fn import_graph(&mut self, record: GraphRecord) -> ImportReport {
        let scale = self.config.scale();
        let mut report = ImportReport::default();

        for (index, shape) in record.shapes.into_iter().enumerate() {
            let inserted = shape
                .to_node(scale)
                .map_err(StoreGraphError::from)
                .and_then(|node| self.registry.insert(node).map_err(StoreGraphError::from));
            match inserted {
                Ok(_) => {
                    self.registry.adjacency_mut().ensure_node(shape.id);
                    report.imported.push(shape.id);
                }
                Err(error) => {
                    warn!(index, %error, "skipped shape on import");
                    report.failures.push(ImportFailure {
                        index: Some(index),
                        error,
                    });
                }
            }
        }

        for (id, neighbors) in record.edges {
            if self.registry.key_of(id).is_none() {
                report.failures.push(ImportFailure {
                    index: None,
                    error: ValidationError::UnknownNode(id.to_string()).into(),
                });
                continue;
            }
            for neighbor in neighbors {
                if self.registry.key_of(neighbor).is_some() {
                    self.registry.adjacency_mut().add_edge(id, neighbor);
                } else {
                    warn!(node = %id, %neighbor, "dropped edge to unknown node");
                }
            }
        }

        self.history.clear();
        info!(
            imported = report.imported.len(),
            failed = report.failures.len(),
            "imported graph"
        );
        report
    }

    /// Runs a command on behalf of the front end.
    ///
    /// # Errors
    ///
    /// Propagates the error of the dispatched command.
    pub fn execute(&mut self, session: &Session, command: Command) -> Result<CommandOutput> {
        Ok(match command {
            Command::AddNode(polygon) => CommandOutput::Added(self.add_node(session, polygon)?),
            Command::DeleteNode(id) => CommandOutput::Deleted(self.delete_node(id)?),
            Command::EditNodeAttributes { id, attributes } => {
                self.edit_node_attributes(id, attributes)?;
                CommandOutput::Done
            }
            Command::ReshapeNode { id, polygon } => {
                self.reshape_node(session, id, polygon)?;
                CommandOutput::Done
            }
            Command::UndoLastDrawing => CommandOutput::Undone(self.undo_last_drawing(session)?),
            Command::Clear => {
                self.clear();
                CommandOutput::Done
            }
            Command::BuildGraph => CommandOutput::Built(self.build_graph()?),
            Command::ExportGraph => CommandOutput::Exported(self.export_graph()),
            Command::ImportGraph(record) => CommandOutput::Imported(self.import_graph(record)),
            Command::TagZones(records) => {
                let zones = self.zones_from_records(&records)?;
                CommandOutput::Tagged(self.tag_zones(zones)?)
            }
        })
    }
}
