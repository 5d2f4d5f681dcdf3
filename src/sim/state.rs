//! Round state and core simulation types

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::world::EntityHandle;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Session created, no tick processed yet
    #[default]
    NotStarted,
    /// Counting down to the next round
    Countdown,
    /// Round in progress
    Active,
    /// Round is being torn down (only observable mid-tick)
    Ending,
}

/// Target categories an enemy can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyCategory {
    Duck,
    Rabbit,
    Deer,
}

impl EnemyCategory {
    /// Every category a round can target
    pub const ALL: [EnemyCategory; 3] = [EnemyCategory::Duck, EnemyCategory::Rabbit, EnemyCategory::Deer];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyCategory::Duck => "Duck",
            EnemyCategory::Rabbit => "Rabbit",
            EnemyCategory::Deer => "Deer",
        }
    }
}

/// One entry in the prefab pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyVariant {
    pub name: String,
    pub category: EnemyCategory,
    /// Rotation the entity is spawned with
    #[serde(default = "default_orientation")]
    pub orientation: Quat,
}

fn default_orientation() -> Quat {
    Quat::IDENTITY
}

impl EnemyVariant {
    pub fn new(name: impl Into<String>, category: EnemyCategory) -> Self {
        Self {
            name: name.into(),
            category,
            orientation: Quat::IDENTITY,
        }
    }
}

/// A live enemy tracked by the population
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    /// Scene entity backing this enemy
    pub handle: EntityHandle,
    pub category: EnemyCategory,
    /// Index into the prefab pool it was spawned from
    pub variant: usize,
    pub health: u32,
    pub position: Vec3,
}

impl Enemy {
    /// Apply damage, returning true once health reaches zero
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Why an enemy left the population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Shot down by the player
    Killed,
    /// Cleared by a round ending
    Forced,
}

/// Ephemeral description of a spawn burst
#[derive(Debug, Clone, Default)]
pub struct SpawnRequest {
    pub count: u32,
    pub health: u32,
    /// Categories to sample variants from (empty = whole pool)
    pub categories: Vec<EnemyCategory>,
}

/// What ended a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    TimeExpired,
    AmmunitionEmpty,
    QuotaMet,
}

/// Result of a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Index of the round that was played
    pub round_index: u32,
    pub cause: EndCause,
    pub kills: u32,
    pub quota: u32,
    /// kills / quota * 100
    pub score: f32,
    pub passed: bool,
}

/// Observable transitions, drained by the caller after each tick
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CountdownFinished { round_index: u32 },
    CategoryChosen(EnemyCategory),
    SpawnBurst { spawned: u32, requested: u32 },
    KillRecorded { enemy: u32, kills: u32 },
    KillIgnored { enemy: u32, category: EnemyCategory },
    ZoneLeft,
    ZoneEntered,
    RoundEnded(RoundOutcome),
}

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Current player position, if known
    pub player_position: Option<Vec3>,
}

/// RNG state wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Mutable per-round bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    /// Countdown accumulated toward the start delay
    pub countdown: f32,
    /// Seconds elapsed in the active round
    pub elapsed: f32,
    pub time_limit: f32,
    /// Latched when the weapon reports an empty clip
    pub ammunition_empty: bool,
    pub active_category: Option<EnemyCategory>,
    pub kills: u32,
    pub quota: u32,
    /// Consecutive rounds passed
    pub round_index: u32,
    /// Set when the quota trigger already advanced `round_index`
    pub index_advanced: bool,
    /// Seconds until the next spawn cycle may start (`None` = idle)
    pub spawn_cooldown: Option<f32>,
    /// Whether the player was inside the allowed area last tick
    pub within_zone: bool,
    pub last_outcome: Option<RoundOutcome>,
}

impl RoundState {
    pub fn new(time_limit: f32, quota: u32) -> Self {
        Self {
            phase: RoundPhase::NotStarted,
            countdown: 0.0,
            elapsed: 0.0,
            time_limit,
            ammunition_empty: false,
            active_category: None,
            kills: 0,
            quota,
            round_index: 0,
            index_advanced: false,
            spawn_cooldown: None,
            within_zone: true,
            last_outcome: None,
        }
    }

    /// Seconds left before the round times out
    pub fn time_remaining(&self) -> f32 {
        (self.time_limit - self.elapsed).max(0.0)
    }

    /// First termination cause that holds, in precedence order
    pub fn end_cause(&self) -> Option<EndCause> {
        if self.elapsed >= self.time_limit {
            Some(EndCause::TimeExpired)
        } else if self.ammunition_empty {
            Some(EndCause::AmmunitionEmpty)
        } else if self.kills >= self.quota {
            Some(EndCause::QuotaMet)
        } else {
            None
        }
    }

    /// Clear everything scoped to a single round
    pub fn reset_round(&mut self) {
        self.countdown = 0.0;
        self.elapsed = 0.0;
        self.ammunition_empty = false;
        self.active_category = None;
        self.kills = 0;
        self.index_advanced = false;
        self.spawn_cooldown = None;
    }
}

/// Score for a round: kills as a percentage of the quota
pub fn round_score(kills: u32, quota: u32) -> f32 {
    if quota == 0 {
        return 0.0;
    }
    // Multiply first so whole percentages come out exact
    kills as f32 * 100.0 / quota as f32
}
