//! Terrain-conforming spawn placement
//!
//! A spawn point on the (x, z) plane is lifted onto the ground by probing
//! straight down from a fixed height. Points with no ground underneath are
//! replaced with freshly sampled ones until the attempt budget runs out.

use glam::{Vec2, Vec3};

use crate::config::SessionConfig;
use crate::error::PlacementError;
use crate::with_height;
use crate::world::{SpatialQuery, SurfaceMask};

#[derive(Debug, Clone)]
pub struct PlacementResolver {
    /// World height probes start from
    pub probe_height: f32,
    pub probe_distance: f32,
    /// Added to the ground hit height
    pub height_offset: f32,
    pub max_attempts: u32,
    pub mask: SurfaceMask,
}

impl PlacementResolver {
    pub fn from_config(config: &SessionConfig, mask: SurfaceMask) -> Self {
        Self {
            probe_height: config.probe_height,
            probe_distance: config.probe_distance,
            height_offset: config.spawn_height_offset,
            max_attempts: config.max_placement_attempts.max(1),
            mask,
        }
    }

    /// Probe a single point. `None` if there is no ground within reach.
    pub fn probe(&self, query: &dyn SpatialQuery, point: Vec2) -> Option<Vec3> {
        let origin = with_height(point, self.probe_height);
        query
            .probe_downward(origin, self.probe_distance, self.mask)
            .map(|hit| with_height(point, hit.y + self.height_offset))
    }

    /// Find a grounded spawn position starting from `point`, drawing a new
    /// point from `resample` after every miss
    pub fn resolve_spawn_height(
        &self,
        query: &dyn SpatialQuery,
        point: Vec2,
        mut resample: impl FnMut() -> Vec2,
    ) -> Result<Vec3, PlacementError> {
        let mut candidate = point;
        for attempt in 1..=self.max_attempts {
            if let Some(position) = self.probe(query, candidate) {
                if attempt > 1 {
                    log::debug!("Spawn point grounded after {} attempts", attempt);
                }
                return Ok(position);
            }
            candidate = resample();
        }
        Err(PlacementError::NoGround {
            attempts: self.max_attempts,
        })
    }
}
