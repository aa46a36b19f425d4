use tracing::{debug, warn};

use super::{BuildFailure, BuildStage};
use crate::error::{GeometryError, Result};
use crate::geometry::Polygon;
use crate::kernel::GeometryKernel;
use crate::registry::NodeRegistry;

/// How an overlapping pair is made disjoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Replace the first polygon with `first \ second`.
    TrimFirst(Polygon),
    /// Replace the second polygon with `second \ first`.
    TrimSecond(Polygon),
}

/// Chooses the cheaper way to remove the overlap between `a` and `b`.
///
/// Each candidate is scored by the total vertex count of the two polygons it
/// leaves behind; the lower score wins and a tie trims `a`. A candidate whose
/// difference is empty or cannot be stored as one ring is not considered.
///
/// # Errors
///
/// Returns the first candidate's error when neither candidate is usable.
pub fn resolve_pair(
    kernel: &dyn GeometryKernel,
    a: &Polygon,
    b: &Polygon,
) -> std::result::Result<Resolution, GeometryError> {
    let trim_a = usable(kernel.difference(a, b), "first");
    let trim_b = usable(kernel.difference(b, a), "second");
    match (trim_a, trim_b) {
        (Ok(diff_ab), Ok(diff_ba)) => {
            let score_a = diff_ab.vertex_count() + b.vertex_count();
            let score_b = diff_ba.vertex_count() + a.vertex_count();
            if score_a <= score_b {
                Ok(Resolution::TrimFirst(diff_ab))
            } else {
                Ok(Resolution::TrimSecond(diff_ba))
            }
        }
        (Ok(diff_ab), Err(_)) => Ok(Resolution::TrimFirst(diff_ab)),
        (Err(_), Ok(diff_ba)) => Ok(Resolution::TrimSecond(diff_ba)),
        (Err(err), Err(_)) => Err(err),
    }
}

fn usable(
    diff: std::result::Result<Option<Polygon>, GeometryError>,
    which: &str,
) -> std::result::Result<Polygon, GeometryError> {
    diff?.ok_or_else(|| {
        GeometryError::Unrepresentable(format!("trimming would erase the {which} polygon"))
    })
}

/// Removes pairwise overlaps between nodes in a single pass.
///
/// Pairs are visited in registry order and mutated in place, so a polygon
/// trimmed by an earlier pair is what later pairs see. Pairs already visited
/// are not re-examined. Every overlapping pair is recorded as adjacent.
pub struct ResolveIntersections<'k> {
    kernel: &'k dyn GeometryKernel,
}

impl<'k> ResolveIntersections<'k> {
    /// Creates a new `ResolveIntersections` operation.
    #[must_use]
    pub fn new(kernel: &'k dyn GeometryKernel) -> Self {
        Self { kernel }
    }

    /// Executes the pass, returning the pairs that could not be resolved.
    ///
    /// # Errors
    ///
    /// Returns an error only if the registry is inconsistent.
    pub fn execute(&self, registry: &mut NodeRegistry) -> Result<Vec<BuildFailure>> {
        let keys = registry.keys();
        let mut failures = Vec::new();

        for (i, &key_a) in keys.iter().enumerate() {
            for &key_b in &keys[i + 1..] {
                let a = registry.node(key_a)?;
                let b = registry.node(key_b)?;
                let (id_a, id_b) = (a.id, b.id);

                match self.kernel.overlaps(&a.polygon, &b.polygon) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(error) => {
                        warn!(%id_a, %id_b, %error, "overlap test failed");
                        failures.push(BuildFailure::new(BuildStage::Resolve, vec![id_a, id_b], error));
                        continue;
                    }
                }

                let outcome = resolve_pair(self.kernel, &a.polygon, &b.polygon);
                registry.adjacency_mut().add_edge(id_a, id_b);
                match outcome {
                    Ok(Resolution::TrimFirst(polygon)) => {
                        debug!(trimmed = %id_a, kept = %id_b, "resolved overlap");
                        registry.node_mut(key_a)?.polygon = polygon;
                    }
                    Ok(Resolution::TrimSecond(polygon)) => {
                        debug!(trimmed = %id_b, kept = %id_a, "resolved overlap");
                        registry.node_mut(key_b)?.polygon = polygon;
                    }
                    Err(error) => {
                        warn!(%id_a, %id_b, %error, "overlap left unresolved");
                        failures.push(BuildFailure::new(BuildStage::Resolve, vec![id_a, id_b], error));
                    }
                }
            }
        }
        Ok(failures)
    }
}
