//! Scene collaborators: ground probing and entity lifetime
//!
//! The simulation never touches the scene directly. It asks a [`SpatialQuery`]
//! where the ground is and an [`EntityFactory`] to create and destroy the
//! entities that back each enemy.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::horizontal;
use crate::sim::state::EnemyVariant;

/// Opaque handle to a scene entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Bit set of physics layers a probe may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const NONE: SurfaceMask = SurfaceMask(0);

    /// Mask selecting a single layer
    pub fn layer(index: u32) -> Self {
        Self(1u32.checked_shl(index).unwrap_or(0))
    }

    pub fn contains_layer(&self, index: u32) -> bool {
        self.0 & Self::layer(index).0 != 0
    }
}

/// Ray queries against scene geometry
pub trait SpatialQuery {
    /// Cast straight down from `origin` up to `max_distance`, returning the
    /// first hit on a surface selected by `mask`
    fn probe_downward(&self, origin: Vec3, max_distance: f32, mask: SurfaceMask) -> Option<Vec3>;
}

/// Creates and destroys the scene entities that back enemies
pub trait EntityFactory {
    fn spawn(
        &mut self,
        variant: &EnemyVariant,
        position: Vec3,
        orientation: Quat,
    ) -> Result<EntityHandle, AdapterError>;

    fn destroy(&mut self, handle: EntityHandle) -> Result<(), AdapterError>;
}

/// Horizontal ground plane, optionally limited to a disk
#[derive(Debug, Clone)]
pub struct FlatGround {
    pub height: f32,
    pub layer: u32,
    /// Centre and radius of the covered area (`None` = infinite plane)
    pub coverage: Option<(Vec2, f32)>,
}

impl FlatGround {
    pub fn new(height: f32, layer: u32) -> Self {
        Self {
            height,
            layer,
            coverage: None,
        }
    }

    /// Restrict the ground to a disk on the (x, z) plane
    pub fn with_coverage(mut self, center: Vec2, radius: f32) -> Self {
        self.coverage = Some((center, radius));
        self
    }

    fn covers(&self, point: Vec2) -> bool {
        match self.coverage {
            Some((center, radius)) => (point - center).length() <= radius,
            None => true,
        }
    }
}

impl SpatialQuery for FlatGround {
    fn probe_downward(&self, origin: Vec3, max_distance: f32, mask: SurfaceMask) -> Option<Vec3> {
        if !mask.contains_layer(self.layer) || !self.covers(horizontal(origin)) {
            return None;
        }
        let drop = origin.y - self.height;
        if (0.0..=max_distance).contains(&drop) {
            Some(Vec3::new(origin.x, self.height, origin.z))
        } else {
            None
        }
    }
}

/// Entity factory that only hands out handles, for headless runs
#[derive(Debug, Default)]
pub struct HeadlessEntityFactory {
    next_handle: u64,
    live: Vec<EntityHandle>,
}

impl HeadlessEntityFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities spawned and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl EntityFactory for HeadlessEntityFactory {
    fn spawn(
        &mut self,
        _variant: &EnemyVariant,
        _position: Vec3,
        _orientation: Quat,
    ) -> Result<EntityHandle, AdapterError> {
        self.next_handle += 1;
        let handle = EntityHandle(self.next_handle);
        self.live.push(handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: EntityHandle) -> Result<(), AdapterError> {
        match self.live.iter().position(|h| *h == handle) {
            Some(index) => {
                self.live.swap_remove(index);
                Ok(())
            }
            None => Err(AdapterError::new("scene", format!("entity {} already destroyed", handle.0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_ground_probe() {
        let ground = FlatGround::new(2.0, 3);
        let hit = ground.probe_downward(Vec3::new(1.0, 10.0, -4.0), 15.0, SurfaceMask::layer(3));
        assert_eq!(hit, Some(Vec3::new(1.0, 2.0, -4.0)));

        // Out of reach
        assert_eq!(ground.probe_downward(Vec3::new(0.0, 10.0, 0.0), 5.0, SurfaceMask::layer(3)), None);
        // Wrong layer
        assert_eq!(ground.probe_downward(Vec3::new(0.0, 10.0, 0.0), 15.0, SurfaceMask::layer(1)), None);
        // Origin below ground
        assert_eq!(ground.probe_downward(Vec3::new(0.0, 1.0, 0.0), 15.0, SurfaceMask::layer(3)), None);
    }

    #[test]
    fn test_flat_ground_coverage() {
        let ground = FlatGround::new(0.0, 0).with_coverage(Vec2::ZERO, 5.0);
        let mask = SurfaceMask::layer(0);
        assert!(ground.probe_downward(Vec3::new(3.0, 10.0, 3.0), 15.0, mask).is_some());
        assert!(ground.probe_downward(Vec3::new(6.0, 10.0, 0.0), 15.0, mask).is_none());
    }

    #[test]
    fn test_headless_factory_tracks_live() {
        let mut factory = HeadlessEntityFactory::new();
        let variant = EnemyVariant::new("mallard", crate::sim::state::EnemyCategory::Duck);
        let a = factory.spawn(&variant, Vec3::ZERO, Quat::IDENTITY).unwrap();
        let b = factory.spawn(&variant, Vec3::ZERO, Quat::IDENTITY).unwrap();
        assert_ne!(a, b);
        assert_eq!(factory.live_count(), 2);
        factory.destroy(a).unwrap();
        assert!(factory.destroy(a).is_err());
        assert_eq!(factory.live_count(), 1);
    }
}
