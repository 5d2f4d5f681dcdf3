//! Quarry Hunt - round-based arcade hunting simulation
//!
//! Core modules:
//! - `sim`: Round state machine, enemy population and spawn placement
//! - `config`: Data-driven session configuration
//! - `presentation`: HUD and audio collaborator interface
//! - `weapon`: Ammunition collaborator interface
//! - `world`: Spatial query and entity factory interfaces
//! - `error`: Error types shared across the crate

pub mod config;
pub mod error;
pub mod presentation;
pub mod sim;
pub mod weapon;
pub mod world;

pub use config::SessionConfig;
pub use error::{AdapterError, ConfigError, PlacementError, PopulationError, SessionError, SpawnError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Round defaults
    pub const ROUND_TIME_LIMIT: f32 = 60.0;
    pub const KILL_QUOTA: u32 = 10;
    pub const START_DELAY: f32 = 3.0;
    pub const CLIP_SIZE: u32 = 30;

    /// Length of one spawn cycle cooldown, in seconds
    pub const SPAWN_WINDOW_SECS: f32 = 1.0;

    /// Ground probe defaults
    pub const PROBE_HEIGHT: f32 = 10.0;
    pub const PROBE_DISTANCE: f32 = 15.0;
    pub const SPAWN_HEIGHT_OFFSET: f32 = 0.15;
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 64;

    /// Upper bound on enemies created by one spawn cycle
    pub const MAX_SPAWNS_PER_WINDOW: u32 = 256;

    /// Physics layer index that ground colliders live on
    pub const GROUND_LAYER: u32 = 3;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn horizontal(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Lift a ground-plane point (x, z) into world space at the given height
#[inline]
pub fn with_height(point: Vec2, y: f32) -> Vec3 {
    Vec3::new(point.x, y, point.y)
}

/// Sample a point uniformly inside a disk on the ground plane.
///
/// `u_radius` and `u_angle` are uniform samples in [0, 1). The square root on
/// the radial sample keeps the density uniform over the disk area.
#[inline]
pub fn disk_point(center: Vec2, radius: f32, u_radius: f32, u_angle: f32) -> Vec2 {
    let r = radius * u_radius.sqrt();
    let theta = u_angle * std::f32::consts::TAU;
    center + polar_to_cartesian(r, theta)
}
