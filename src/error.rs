//! Error types
//!
//! Configuration problems surface when a session is built. Everything that can
//! fail during a tick is reported and swallowed so the round state machine
//! keeps running.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("enemy prefab pool is empty")]
    EmptyPrefabPool,
    #[error("spawn zone radius must be positive and finite, got {0}")]
    InvalidZoneRadius(f32),
    #[error("kill quota must be at least 1")]
    ZeroQuota,
    #[error("enemy health must be at least 1")]
    ZeroEnemyHealth,
    #[error("spawns per window must be at most {max}, got {value}")]
    TooManySpawns { value: u32, max: u32 },
    #[error("round time limit must be positive, got {0}")]
    InvalidRoundTime(f32),
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("ground layer {0} does not fit in a 32-bit surface mask")]
    InvalidGroundLayer(u32),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ground probing gave up without finding a surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no ground found under the spawn zone after {attempts} attempts")]
    NoGround { attempts: u32 },
}

/// Lookup of a tracked enemy failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulationError {
    #[error("enemy {0} is not in the population")]
    NotFound(u32),
}

/// Failure reported by an external collaborator (HUD, audio, weapon, scene)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{adapter} adapter failed: {message}")]
pub struct AdapterError {
    pub adapter: &'static str,
    pub message: String,
}

impl AdapterError {
    pub fn new(adapter: &'static str, message: impl Into<String>) -> Self {
        Self {
            adapter,
            message: message.into(),
        }
    }
}

/// A single enemy could not be materialized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Session construction failure
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Log and drop a collaborator failure
pub(crate) fn swallow(result: Result<(), AdapterError>) {
    if let Err(e) = result {
        log::warn!("{}", e);
    }
}
