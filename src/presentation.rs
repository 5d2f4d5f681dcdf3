//! HUD and audio collaborator
//!
//! The session reports what the player should see and hear through
//! [`Presentation`]. Failures are logged by the caller and never stop a round.

use crate::error::AdapterError;
use crate::sim::state::EnemyCategory;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Countdown finished, round is live
    RoundStart,
    /// Enemy of the active category went down
    Kill,
    /// Round ended with a passing score
    RoundPassed,
    /// Round ended below the required score
    RoundFailed,
}

/// HUD and audio sink
pub trait Presentation {
    /// Show which category counts this round
    fn display_active_category(&mut self, category: EnemyCategory) -> Result<(), AdapterError>;

    fn set_category_tracker_visible(&mut self, visible: bool) -> Result<(), AdapterError>;

    /// A kill counted toward the quota
    fn notify_kill_recorded(&mut self) -> Result<(), AdapterError>;

    fn play_cue(&mut self, _cue: AudioCue) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Presentation that writes everything to the log
#[derive(Debug, Default)]
pub struct LogPresentation {
    kills_shown: u32,
}

impl LogPresentation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presentation for LogPresentation {
    fn display_active_category(&mut self, category: EnemyCategory) -> Result<(), AdapterError> {
        self.kills_shown = 0;
        log::info!("Target: {}", category.as_str());
        Ok(())
    }

    fn set_category_tracker_visible(&mut self, visible: bool) -> Result<(), AdapterError> {
        log::debug!("Category tracker visible: {}", visible);
        Ok(())
    }

    fn notify_kill_recorded(&mut self) -> Result<(), AdapterError> {
        self.kills_shown += 1;
        log::debug!("Tracker kills: {}", self.kills_shown);
        Ok(())
    }

    fn play_cue(&mut self, cue: AudioCue) -> Result<(), AdapterError> {
        log::debug!("Cue: {:?}", cue);
        Ok(())
    }
}

/// Presentation that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn display_active_category(&mut self, _category: EnemyCategory) -> Result<(), AdapterError> {
        Ok(())
    }

    fn set_category_tracker_visible(&mut self, _visible: bool) -> Result<(), AdapterError> {
        Ok(())
    }

    fn notify_kill_recorded(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }
}
