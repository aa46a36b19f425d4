use tracing::{debug, warn};

use super::{BuildFailure, BuildStage};
use crate::error::{GeometryError, Result};
use crate::geometry::{Aabb, Polygon};
use crate::kernel::GeometryKernel;
use crate::registry::{Node, NodeId, NodeKey, NodeRegistry};

/// Axis along which a polygon is sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cuts are vertical lines; slices run left to right.
    X,
    /// Cuts are horizontal lines; slices run bottom to top.
    Y,
}

impl SplitAxis {
    /// The longer side of the box, preferring `X` for squares.
    #[must_use]
    pub fn of(aabb: &Aabb) -> Self {
        if aabb.width() < aabb.height() {
            Self::Y
        } else {
            Self::X
        }
    }

    fn extent(self, aabb: &Aabb) -> f64 {
        match self {
            Self::X => aabb.width(),
            Self::Y => aabb.height(),
        }
    }

    /// The part of `aabb` between `from` and `to`, measured from its minimum
    /// along this axis.
    fn band(self, aabb: &Aabb, from: f64, to: f64) -> Polygon {
        let reaches_end = to >= self.extent(aabb);
        match self {
            Self::X => {
                let hi = if reaches_end { aabb.max.x } else { aabb.min.x + to };
                Polygon::rectangle(aabb.min.x + from, aabb.min.y, hi, aabb.max.y)
            }
            Self::Y => {
                let hi = if reaches_end { aabb.max.y } else { aabb.min.y + to };
                Polygon::rectangle(aabb.min.x, aabb.min.y + from, aabb.max.x, hi)
            }
        }
    }
}

/// Number of slices needed so none is longer than `max_length`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn segment_count(aabb: &Aabb, max_length: f64) -> usize {
    let extent = SplitAxis::of(aabb).extent(aabb);
    if extent <= 0.0 || max_length <= 0.0 {
        return 0;
    }
    (extent / max_length).ceil() as usize
}

/// Slices `polygon` into bands of at most `max_length` along its longer axis.
///
/// Returns the resulting pieces in slice order, together with one error per
/// slice that produced nothing. A slice that falls apart yields one piece per
/// part. A polygon that needs at most one slice comes back unchanged.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the polygon has no bounding box.
#[allow(clippy::cast_precision_loss)]
pub fn split_polygon(
    kernel: &dyn GeometryKernel,
    polygon: &Polygon,
    max_length: f64,
) -> std::result::Result<(Vec<Polygon>, Vec<GeometryError>), GeometryError> {
    let aabb = kernel.bounding_box(polygon)?;
    let segments = segment_count(&aabb, max_length);
    if segments <= 1 {
        return Ok((vec![polygon.clone()], Vec::new()));
    }

    let axis = SplitAxis::of(&aabb);
    let extent = axis.extent(&aabb);
    let mut pieces = Vec::new();
    let mut dropped = Vec::new();
    let mut remainder = vec![polygon.clone()];

    for i in 1..segments {
        let offset = i as f64 * max_length;
        // Everything beyond the cut is clipped away from the current slice.
        let beyond = axis.band(&aabb, offset, extent);
        let slab = axis.band(&aabb, offset - max_length, offset);

        let before = pieces.len();
        let mut next = Vec::with_capacity(remainder.len());
        for part in &remainder {
            match kernel.difference_parts(part, &beyond) {
                Ok(parts) => pieces.extend(parts),
                Err(err) => dropped.push(err),
            }
            match kernel.difference_parts(part, &slab) {
                Ok(parts) => next.extend(parts),
                Err(err) => dropped.push(err),
            }
        }
        if pieces.len() == before {
            dropped.push(GeometryError::Degenerate(format!(
                "slice {i} of {segments} is empty"
            )));
        }
        remainder = next;
    }
    pieces.extend(remainder);
    Ok((pieces, dropped))
}

/// Replaces one oversized node with its slices.
///
/// Children inherit the parent's labels, are flagged as split, and are
/// appended to the registry; the parent is retired. A node that fits in one
/// slice, or whose every slice is dropped, is only flagged. A node that is
/// already flagged is left alone.
pub struct SplitNode<'k> {
    kernel: &'k dyn GeometryKernel,
    node: NodeKey,
    max_length: f64,
}

impl<'k> SplitNode<'k> {
    /// Creates a new `SplitNode` operation.
    #[must_use]
    pub fn new(kernel: &'k dyn GeometryKernel, node: NodeKey, max_length: f64) -> Self {
        Self {
            kernel,
            node,
            max_length,
        }
    }

    /// Executes the split, returning the new children and any dropped slices.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not address a live node.
    pub fn execute(&self, registry: &mut NodeRegistry) -> Result<(Vec<NodeId>, Vec<BuildFailure>)> {
        let parent = registry.node(self.node)?;
        if parent.already_split {
            return Ok((Vec::new(), Vec::new()));
        }
        let parent_id = parent.id;

        let aabb = match self.kernel.bounding_box(&parent.polygon) {
            Ok(aabb) => aabb,
            Err(error) => {
                warn!(node = %parent_id, %error, "cannot split node");
                registry.node_mut(self.node)?.already_split = true;
                return Ok((Vec::new(), vec![BuildFailure::new(BuildStage::Split, vec![parent_id], error)]));
            }
        };
        if segment_count(&aabb, self.max_length) <= 1 {
            registry.node_mut(self.node)?.already_split = true;
            return Ok((Vec::new(), Vec::new()));
        }

        let (pieces, dropped) = match split_polygon(self.kernel, &parent.polygon, self.max_length) {
            Ok(result) => result,
            Err(error) => {
                warn!(node = %parent_id, %error, "cannot split node");
                return Ok((Vec::new(), vec![BuildFailure::new(BuildStage::Split, vec![parent_id], error)]));
            }
        };
        let failures: Vec<BuildFailure> = dropped
            .into_iter()
            .map(|error| {
                warn!(node = %parent_id, %error, "dropped slice");
                BuildFailure::new(BuildStage::Split, vec![parent_id], error)
            })
            .collect();
        if pieces.is_empty() {
            // Nothing survived; keep the parent and stop retrying it.
            registry.node_mut(self.node)?.already_split = true;
            return Ok((Vec::new(), failures));
        }

        let children: Vec<Node> = pieces
            .into_iter()
            .map(|piece| Node::child_of(parent, piece))
            .collect();
        let mut ids = Vec::with_capacity(children.len());
        for child in children {
            ids.push(child.id);
            registry.insert(child)?;
        }
        registry.retire(self.node);
        debug!(node = %parent_id, children = ids.len(), "split node");
        Ok((ids, failures))
    }
}

/// Outcome of splitting every node.
#[derive(Debug, Default)]
pub struct SplitReport {
    /// Nodes replaced by their slices.
    pub replaced: usize,
    /// Children created.
    pub created: Vec<NodeId>,
    pub failures: Vec<BuildFailure>,
}

/// Splits every node that has not been split yet.
///
/// Parents are retired, not removed; callers compact the registry afterwards.
pub struct SplitOversized<'k> {
    kernel: &'k dyn GeometryKernel,
    max_length: f64,
}

impl<'k> SplitOversized<'k> {
    /// Creates a new `SplitOversized` operation.
    #[must_use]
    pub fn new(kernel: &'k dyn GeometryKernel, max_length: f64) -> Self {
        Self { kernel, max_length }
    }

    /// Executes the pass over the nodes present when it starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is inconsistent.
    pub fn execute(&self, registry: &mut NodeRegistry) -> Result<SplitReport> {
        let mut report = SplitReport::default();
        for key in registry.keys() {
            let (children, failures) =
                SplitNode::new(self.kernel, key, self.max_length).execute(registry)?;
            if !children.is_empty() {
                report.replaced += 1;
            }
            report.created.extend(children);
            report.failures.extend(failures);
        }
        Ok(report)
    }
}
