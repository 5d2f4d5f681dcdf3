//! Round session controller
//!
//! Drives the round lifecycle one tick at a time:
//! countdown, active round (category pick, spawn cadence, timer), and the
//! synchronous teardown and scoring when a round ends.

use rand::Rng;
use rand_pcg::Pcg32;

use super::population::EnemyPopulation;
use super::state::{
    EndCause, Enemy, EnemyCategory, RemovalCause, RngState, RoundOutcome, RoundPhase, RoundState,
    SessionEvent, SpawnRequest, TickInput, round_score,
};
use crate::config::SessionConfig;
use crate::error::{PopulationError, SessionError, swallow};
use crate::presentation::{AudioCue, Presentation};
use crate::weapon::WeaponAdapter;
use crate::world::{EntityFactory, SpatialQuery};

pub struct Session {
    config: SessionConfig,
    round: RoundState,
    population: EnemyPopulation,
    presentation: Box<dyn Presentation>,
    weapon: Box<dyn WeaponAdapter>,
    rng: Pcg32,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Build a session and the enemy population it drives from one config.
    /// `query` and `factory` are handed to the population.
    pub fn new(
        config: SessionConfig,
        query: Box<dyn SpatialQuery>,
        factory: Box<dyn EntityFactory>,
        presentation: Box<dyn Presentation>,
        weapon: Box<dyn WeaponAdapter>,
    ) -> Result<Self, SessionError> {
        let population = EnemyPopulation::new(&config, query, factory)?;
        let rng = RngState::new(config.seed).to_rng();
        let round = RoundState::new(config.round_time_limit, config.kill_quota);
        Ok(Self {
            config,
            round,
            population,
            presentation,
            weapon,
            rng,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn population(&self) -> &EnemyPopulation {
        &self.population
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn round_index(&self) -> u32 {
        self.round.round_index
    }

    pub fn active_category(&self) -> Option<EnemyCategory> {
        self.round.active_category
    }

    pub fn time_remaining(&self) -> f32 {
        self.round.time_remaining()
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.round.last_outcome.as_ref()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Weapon reports an empty clip. Ignored outside an active round.
    pub fn on_ammunition_exhausted(&mut self) {
        if self.round.phase == RoundPhase::Active {
            self.round.ammunition_empty = true;
        }
    }

    /// An enemy was killed outright
    pub fn on_enemy_killed(&mut self, id: u32) -> Result<(), PopulationError> {
        let round = &mut self.round;
        let presentation = self.presentation.as_mut();
        let events = &mut self.events;
        self.population
            .delete_enemy(id, |enemy, cause| record_removal(round, presentation, events, enemy, cause))?;
        Ok(())
    }

    /// An enemy was hit. Returns whether the hit killed it.
    pub fn on_enemy_hit(&mut self, id: u32, damage: u32) -> Result<bool, PopulationError> {
        let round = &mut self.round;
        let presentation = self.presentation.as_mut();
        let events = &mut self.events;
        self.population.damage_enemy(id, damage, |enemy, cause| {
            record_removal(round, presentation, events, enemy, cause)
        })
    }

    /// Advance the session by `dt` seconds. Negative or non-finite steps
    /// count as zero.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.round.phase {
            RoundPhase::Active => self.tick_active(dt),
            RoundPhase::NotStarted | RoundPhase::Countdown | RoundPhase::Ending => self.tick_countdown(dt),
        }
        self.update_zone(input);
    }

    fn tick_countdown(&mut self, dt: f32) {
        self.round.phase = RoundPhase::Countdown;
        self.round.countdown += dt;
        if self.round.countdown < self.config.start_delay {
            return;
        }

        self.round.countdown = 0.0;
        swallow(self.weapon.set_ammunition_capacity(self.config.clip_size));
        swallow(self.presentation.play_cue(AudioCue::RoundStart));
        self.round.phase = RoundPhase::Active;
        self.events.push(SessionEvent::CountdownFinished {
            round_index: self.round.round_index,
        });
        log::info!("Round {} started", self.round.round_index + 1);
    }

    fn tick_active(&mut self, dt: f32) {
        if self.round.active_category.is_none() {
            self.choose_category();
        }

        self.update_spawn_cycle(dt);

        self.round.elapsed += dt;
        if let Some(cause) = self.round.end_cause() {
            if cause == EndCause::QuotaMet {
                self.round.round_index += 1;
                self.round.index_advanced = true;
            }
            self.round.phase = RoundPhase::Ending;
            self.end_round(cause);
        }
    }

    fn choose_category(&mut self) {
        let category = EnemyCategory::ALL[self.rng.random_range(0..EnemyCategory::ALL.len())];
        self.round.active_category = Some(category);
        swallow(self.presentation.display_active_category(category));
        swallow(self.presentation.set_category_tracker_visible(true));
        self.events.push(SessionEvent::CategoryChosen(category));
    }

    fn update_spawn_cycle(&mut self, dt: f32) {
        if let Some(remaining) = self.round.spawn_cooldown {
            let remaining = remaining - dt;
            self.round.spawn_cooldown = (remaining > 0.0).then_some(remaining);
        }
        if self.round.spawn_cooldown.is_none() {
            self.start_spawn_cycle();
        }
    }

    fn start_spawn_cycle(&mut self) {
        let request = SpawnRequest {
            count: self.config.spawns_per_window.max(1),
            health: self.config.enemy_health,
            categories: Vec::new(),
        };
        let spawned = self.population.spawn(&request, &mut self.rng);
        self.events.push(SessionEvent::SpawnBurst {
            spawned: spawned.len() as u32,
            requested: request.count,
        });
        self.round.spawn_cooldown = Some(self.config.spawn_window_secs);
    }

    /// Tear the round down and score it. Runs inside the tick that detected
    /// the end, so no tick ever observes a half-reset round.
    fn end_round(&mut self, cause: EndCause) {
        let kills = self.round.kills;
        let advanced = self.round.index_advanced;
        let played = self.round.round_index - u32::from(advanced);

        self.round.spawn_cooldown = None;
        swallow(self.weapon.set_ammunition_capacity(0));
        {
            let round = &mut self.round;
            let presentation = self.presentation.as_mut();
            let events = &mut self.events;
            self.population
                .delete_all_enemies(|enemy, cause| record_removal(round, presentation, events, enemy, cause));
        }
        swallow(self.presentation.set_category_tracker_visible(false));
        self.round.reset_round();

        let score = round_score(kills, self.round.quota);
        let passed = score >= self.config.required_score;
        if passed {
            if !advanced {
                self.round.round_index += 1;
            }
        } else {
            self.round.round_index = 0;
        }

        let outcome = RoundOutcome {
            round_index: played,
            cause,
            kills,
            quota: self.round.quota,
            score,
            passed,
        };
        log::info!(
            "Round {} ended ({:?}): {}/{} kills, score {:.0}, {}",
            played + 1,
            cause,
            kills,
            outcome.quota,
            score,
            if passed { "passed" } else { "failed" }
        );
        swallow(self.presentation.play_cue(if passed {
            AudioCue::RoundPassed
        } else {
            AudioCue::RoundFailed
        }));
        self.round.last_outcome = Some(outcome.clone());
        self.events.push(SessionEvent::RoundEnded(outcome));
        self.round.phase = RoundPhase::Countdown;
    }

    /// Track whether the player is inside the allowed area. Informational
    /// only: leaving the area does not affect the round.
    fn update_zone(&mut self, input: &TickInput) {
        let Some(position) = input.player_position else { return };
        let distance = (position - self.config.player_anchor).length();
        let within = distance < self.config.move_radius;
        if within != self.round.within_zone {
            self.events.push(if within {
                SessionEvent::ZoneEntered
            } else {
                SessionEvent::ZoneLeft
            });
            log::debug!("Player {} the zone ({:.1} from anchor)", if within { "entered" } else { "left" }, distance);
        }
        self.round.within_zone = within;
    }
}

/// Kill bookkeeping for an enemy leaving the population
fn record_removal(
    round: &mut RoundState,
    presentation: &mut dyn Presentation,
    events: &mut Vec<SessionEvent>,
    enemy: &Enemy,
    cause: RemovalCause,
) {
    if cause == RemovalCause::Forced {
        return;
    }
    if round.active_category == Some(enemy.category) {
        round.kills += 1;
        swallow(presentation.notify_kill_recorded());
        swallow(presentation.play_cue(AudioCue::Kill));
        events.push(SessionEvent::KillRecorded {
            enemy: enemy.id,
            kills: round.kills,
        });
    } else {
        events.push(SessionEvent::KillIgnored {
            enemy: enemy.id,
            category: enemy.category,
        });
    }
}
