//! Session configuration
//!
//! Loaded from a JSON file by the runner; every field falls back to the
//! defaults in [`crate::consts`] when omitted.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::state::{EnemyCategory, EnemyVariant};

/// Tunables for one play session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed for category picks, variant picks and spawn points
    pub seed: u64,

    // === Round ===
    /// Seconds of countdown before each round starts
    pub start_delay: f32,
    /// Round length in seconds
    pub round_time_limit: f32,
    /// Kills of the active category needed to clear the round
    pub kill_quota: u32,
    /// Minimum score (0-100) to pass a round
    pub required_score: f32,
    /// Rounds loaded into the weapon when a round starts
    pub clip_size: u32,

    // === Spawning ===
    /// Enemies created per spawn cycle (clamped to at least 1, at most
    /// [`MAX_SPAWNS_PER_WINDOW`])
    pub spawns_per_window: u32,
    /// Cooldown between spawn cycles, in seconds
    pub spawn_window_secs: f32,
    /// Health given to each spawned enemy
    pub enemy_health: u32,
    /// Centre of the spawn disk
    pub zone_center: Vec3,
    /// Radius of the spawn disk
    pub zone_radius: f32,
    /// Variants a spawn may pick from
    pub prefabs: Vec<EnemyVariant>,

    // === Placement ===
    /// Height the ground probe starts from
    pub probe_height: f32,
    /// Maximum ground probe length
    pub probe_distance: f32,
    /// Added to the ground hit height so enemies stand on the surface
    pub spawn_height_offset: f32,
    /// Fresh spawn points tried before giving up on one enemy
    pub max_placement_attempts: u32,
    /// Physics layer ground colliders are on
    pub ground_layer: u32,

    // === Player zone ===
    /// Point the player's allowed area is centred on
    pub player_anchor: Vec3,
    /// Radius of the player's allowed area
    pub move_radius: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            start_delay: START_DELAY,
            round_time_limit: ROUND_TIME_LIMIT,
            kill_quota: KILL_QUOTA,
            required_score: 60.0,
            clip_size: CLIP_SIZE,

            spawns_per_window: 1,
            spawn_window_secs: SPAWN_WINDOW_SECS,
            enemy_health: 1,
            zone_center: Vec3::ZERO,
            zone_radius: 20.0,
            prefabs: vec![
                EnemyVariant::new("mallard", EnemyCategory::Duck),
                EnemyVariant::new("cottontail", EnemyCategory::Rabbit),
                EnemyVariant::new("whitetail", EnemyCategory::Deer),
            ],

            probe_height: PROBE_HEIGHT,
            probe_distance: PROBE_DISTANCE,
            spawn_height_offset: SPAWN_HEIGHT_OFFSET,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            ground_layer: GROUND_LAYER,

            player_anchor: Vec3::ZERO,
            move_radius: 25.0,
        }
    }
}

impl SessionConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefabs.is_empty() {
            return Err(ConfigError::EmptyPrefabPool);
        }
        if !(self.zone_radius.is_finite() && self.zone_radius > 0.0) {
            return Err(ConfigError::InvalidZoneRadius(self.zone_radius));
        }
        if self.kill_quota == 0 {
            return Err(ConfigError::ZeroQuota);
        }
        if self.enemy_health == 0 {
            return Err(ConfigError::ZeroEnemyHealth);
        }
        if self.spawns_per_window > MAX_SPAWNS_PER_WINDOW {
            return Err(ConfigError::TooManySpawns {
                value: self.spawns_per_window,
                max: MAX_SPAWNS_PER_WINDOW,
            });
        }
        if self.round_time_limit.is_nan() || self.round_time_limit <= 0.0 {
            return Err(ConfigError::InvalidRoundTime(self.round_time_limit));
        }
        for (field, value) in [
            ("start_delay", self.start_delay),
            ("spawn_window_secs", self.spawn_window_secs),
            ("probe_distance", self.probe_distance),
            ("move_radius", self.move_radius),
            ("required_score", self.required_score),
        ] {
            if value < 0.0 || value.is_nan() {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.ground_layer >= u32::BITS {
            return Err(ConfigError::InvalidGroundLayer(self.ground_layer));
        }
        Ok(())
    }
}
