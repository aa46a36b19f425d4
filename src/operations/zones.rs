use tracing::{debug, warn};

use super::{BuildFailure, BuildStage};
use crate::error::Result;
use crate::kernel::GeometryKernel;
use crate::registry::NodeRegistry;
use crate::zone::Zone;

/// Records, on every node, the zones it touches.
///
/// Boundary contact counts. Memberships are recomputed from the given zones
/// on every run, so a node that was trimmed, reshaped or moved away from a
/// zone loses it. A zone is never recorded twice on the same node.
pub struct TagZones<'a> {
    kernel: &'a dyn GeometryKernel,
    zones: &'a [Zone],
}

impl<'a> TagZones<'a> {
    /// Creates a new `TagZones` operation.
    #[must_use]
    pub fn new(kernel: &'a dyn GeometryKernel, zones: &'a [Zone]) -> Self {
        Self { kernel, zones }
    }

    /// Executes the tagging, returning node/zone pairs that could not be tested.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is inconsistent.
    pub fn execute(&self, registry: &mut NodeRegistry) -> Result<Vec<BuildFailure>> {
        let mut failures = Vec::new();
        let mut tagged = 0_usize;

        for key in registry.keys() {
            registry.node_mut(key)?.zones.clear();
            for zone in self.zones {
                let node = registry.node(key)?;
                let id = node.id;
                match self.kernel.disjoint(&node.polygon, &zone.polygon) {
                    Ok(true) => {}
                    Ok(false) => {
                        if registry.node_mut(key)?.add_zone(&zone.id) {
                            tagged += 1;
                        }
                    }
                    Err(error) => {
                        warn!(node = %id, zone = %zone.id, %error, "zone test failed");
                        let mut failure = BuildFailure::new(BuildStage::ZoneTagging, vec![id], error);
                        failure.zone = Some(zone.id.clone());
                        failures.push(failure);
                    }
                }
            }
        }

        debug!(zones = self.zones.len(), tagged, "tagged zones");
        Ok(failures)
    }
}
