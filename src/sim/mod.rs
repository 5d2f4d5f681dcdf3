//! Deterministic simulation module
//!
//! All round logic lives here. Given the same config, seed and inputs a
//! session produces the same rounds:
//! - Seeded RNG only
//! - Stable iteration order (by enemy ID)
//! - No rendering or platform dependencies

pub mod placement;
pub mod population;
pub mod session;
pub mod state;

pub use placement::PlacementResolver;
pub use population::EnemyPopulation;
pub use session::Session;
pub use state::{
    EndCause, Enemy, EnemyCategory, EnemyVariant, RemovalCause, RoundOutcome, RoundPhase, RoundState,
    SessionEvent, SpawnRequest, TickInput, round_score,
};
