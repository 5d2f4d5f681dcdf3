//! Quarry Hunt headless runner
//!
//! Loads a session config (first argument, JSON) and plays a number of rounds
//! (second argument, default 5) with a scripted marksman, logging each outcome.

use std::error::Error;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use quarry_hunt::consts::*;
use quarry_hunt::presentation::LogPresentation;
use quarry_hunt::sim::{RoundPhase, Session, SessionEvent, TickInput};
use quarry_hunt::weapon::SharedClip;
use quarry_hunt::world::{FlatGround, HeadlessEntityFactory};
use quarry_hunt::{SessionConfig, polar_to_cartesian, with_height};

/// Seconds between trigger pulls
const FIRE_INTERVAL: f32 = 0.35;
/// Chance a pull lands on the intended target
const ACCURACY: f32 = 0.7;
/// Chance the marksman aims at the wrong category
const CONFUSION: f32 = 0.15;

/// Scripted player: walks a loop around the anchor and shoots at whatever
/// the tracker says to hunt
struct Marksman {
    rng: Pcg32,
    clip: SharedClip,
    cooldown: f32,
    time: f32,
}

impl Marksman {
    fn new(seed: u64, clip: SharedClip) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_f00d),
            clip,
            cooldown: 0.0,
            time: 0.0,
        }
    }

    fn position(&self, anchor: Vec3) -> Vec3 {
        let radius = 20.0 + 8.0 * (self.time * 0.2).sin();
        anchor + with_height(polar_to_cartesian(radius, self.time * 0.3), 0.0)
    }

    fn act(&mut self, session: &mut Session, dt: f32) {
        self.time += dt;
        if session.phase() != RoundPhase::Active {
            self.cooldown = 0.0;
            return;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }
        self.cooldown = FIRE_INTERVAL;

        let Some(active) = session.active_category() else { return };
        let confused = self.rng.random::<f32>() < CONFUSION;
        let target = session
            .population()
            .iter()
            .find(|e| (e.category == active) != confused)
            .map(|e| e.id);
        let Some(target) = target else { return };

        if !self.clip.fire() {
            session.on_ammunition_exhausted();
            return;
        }
        if self.rng.random::<f32>() < ACCURACY {
            if let Err(e) = session.on_enemy_hit(target, 1) {
                log::warn!("Shot at vanished target: {}", e);
            }
        }
        if self.clip.is_empty() {
            session.on_ammunition_exhausted();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Quarry Hunt (headless) starting...");
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let rounds: u32 = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(5);

    let ground = FlatGround::new(config.zone_center.y, config.ground_layer);
    let clip = SharedClip::new();
    let anchor = config.player_anchor;
    let seed = config.seed;
    let mut session = Session::new(
        config,
        Box::new(ground),
        Box::new(HeadlessEntityFactory::new()),
        Box::new(LogPresentation::new()),
        Box::new(clip.clone()),
    )?;
    let mut marksman = Marksman::new(seed, clip);
    log::info!("Session initialized with seed: {}", seed);

    // Variable frame times fed through a fixed-step accumulator
    let mut frame_rng = Pcg32::seed_from_u64(seed);
    let mut accumulator = 0.0f32;
    let mut finished = 0;
    let mut passed = 0;
    let mut best_streak = 0;
    let max_steps = u64::from(rounds.max(1)) * 10 * 60 * 60;
    let mut steps = 0u64;

    while finished < rounds && steps < max_steps {
        let frame_dt: f32 = frame_rng.random_range(1.0 / 90.0..1.0 / 45.0);
        accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                player_position: Some(marksman.position(anchor)),
            };
            session.tick(&input, SIM_DT);
            marksman.act(&mut session, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
            steps += 1;

            for event in session.drain_events() {
                match event {
                    SessionEvent::RoundEnded(outcome) => {
                        finished += 1;
                        if outcome.passed {
                            passed += 1;
                        }
                        best_streak = best_streak.max(session.round_index());
                    }
                    SessionEvent::ZoneLeft => log::info!("Player left the hunting zone"),
                    _ => {}
                }
            }
        }
    }

    if finished < rounds {
        log::warn!("Stopped after {} simulation steps", steps);
    }
    log::info!(
        "Played {} rounds: {} passed, best streak {}",
        finished,
        passed,
        best_streak
    );
    Ok(())
}
