//! Match state and core simulation types
//!
//! `MatchState` owns everything a running duel needs: both fighters, the
//! arena, tuning, counters and the seeded RNG. No global state; any number of
//! matches can run side by side.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::fighter::{Fighter, Side};
use crate::error::ConfigError;
use crate::settings::Settings;

/// How a finished match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Draw,
    Winner(Side),
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Physics advancing
    Running,
    /// Frozen; frames still tick but advance nothing
    Paused,
    /// Terminal until reset
    Finished(Outcome),
}

/// Counters shown by the HUD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Scored (damaging) hits
    pub collision_count: u32,
    pub wall_bounce_count: u32,
    /// Hits landed within the combo window of each other
    pub combo_chain: u32,
    pub max_combo: u32,
    /// Total hit points removed from both fighters
    pub damage_dealt: f32,
    pub energy: f32,
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    pub lancer: Fighter,
    pub shuriken: Fighter,
    pub phase: MatchPhase,
    pub stats: MatchStats,
    /// Seconds simulated since the last reset
    pub simulation_time: f32,
    /// Seconds until the next hit may deal damage
    pub collision_cooldown: f32,
    /// Seconds left for the next hit to extend the combo
    pub combo_timer: f32,
    pub slow_motion: bool,
    pub focus_active: bool,
}

impl MatchState {
    /// Validate the settings and start a match
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let lancer = Fighter::lancer(&settings.arena, &settings.lancer, &mut rng);
        let shuriken = Fighter::shuriken(&settings.arena, &settings.shuriken, &mut rng);
        let stats = MatchStats {
            energy: settings.focus.energy_max,
            ..Default::default()
        };

        log::info!(
            "New {} match (seed {})",
            settings.preset.as_str(),
            seed
        );

        Ok(Self {
            seed,
            rng,
            settings,
            lancer,
            shuriken,
            phase: MatchPhase::Running,
            stats,
            simulation_time: 0.0,
            collision_cooldown: 0.0,
            combo_timer: 0.0,
            slow_motion: false,
            focus_active: false,
        })
    }

    /// Rebuild both fighters and zero every counter. Legal from any phase.
    ///
    /// Fresh randomness comes from the continuing RNG stream.
    pub fn reset(&mut self) {
        self.lancer = Fighter::lancer(&self.settings.arena, &self.settings.lancer, &mut self.rng);
        self.shuriken =
            Fighter::shuriken(&self.settings.arena, &self.settings.shuriken, &mut self.rng);
        self.stats = MatchStats {
            energy: self.settings.focus.energy_max,
            ..Default::default()
        };
        self.phase = MatchPhase::Running;
        self.simulation_time = 0.0;
        self.collision_cooldown = 0.0;
        self.combo_timer = 0.0;
        self.slow_motion = false;
        self.focus_active = false;
        log::info!("Match reset");
    }

    /// Reset with a new seed (reproducible restarts)
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.reset();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.settings.arena
    }

    pub fn fighter(&self, side: Side) -> &Fighter {
        match side {
            Side::Lancer => &self.lancer,
            Side::Shuriken => &self.shuriken,
        }
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut Fighter {
        match side {
            Side::Lancer => &mut self.lancer,
            Side::Shuriken => &mut self.shuriken,
        }
    }

    pub fn game_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Finished(_))
    }

    /// `None` while the match is still undecided
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            MatchPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Multiplier the frame driver applies to wall-clock deltas
    pub fn time_scale(&self) -> f32 {
        match self.phase {
            MatchPhase::Running if self.slow_motion => self.settings.physics.slow_motion_scale,
            MatchPhase::Running => 1.0,
            MatchPhase::Paused | MatchPhase::Finished(_) => 0.0,
        }
    }

    /// Toggle between Running and Paused. Ignored once finished.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            MatchPhase::Running => MatchPhase::Paused,
            MatchPhase::Paused => MatchPhase::Running,
            finished => finished,
        };
    }

    pub fn toggle_slow_motion(&mut self) {
        if !self.game_over() {
            self.slow_motion = !self.slow_motion;
        }
    }

    /// Toggle the focus slow-field. Needs energy to switch on.
    pub fn toggle_focus(&mut self) {
        if self.game_over() {
            return;
        }
        self.focus_active = !self.focus_active && self.stats.energy > 0.0;
    }

    /// Nudge the controlled fighter toward `target`.
    ///
    /// A target on top of the fighter pushes along +X. Ignored unless running.
    pub fn apply_directed_impulse(&mut self, target: Vec2) {
        if self.phase != MatchPhase::Running {
            return;
        }
        let impulse = self.settings.focus.nudge_impulse;
        let controlled = self.settings.focus.controlled;
        let body = &mut self.fighter_mut(controlled).body;
        let dir = (target - body.pos).try_normalize().unwrap_or(Vec2::X);
        body.apply_impulse(dir * impulse);
    }

    /// Mark the match finished. Later calls are no-ops.
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        if self.game_over() {
            return;
        }
        self.phase = MatchPhase::Finished(outcome);
        self.focus_active = false;
        match outcome {
            Outcome::Draw => log::info!("Both fighters fell: draw"),
            Outcome::Winner(side) => log::info!("{} wins", side.as_str()),
        }
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            lancer: FighterSnapshot::of(&self.lancer),
            shuriken: FighterSnapshot::of(&self.shuriken),
            stats: self.stats.clone(),
            phase: self.phase,
            simulation_time: self.simulation_time,
            slow_motion: self.slow_motion,
            focus_active: self.focus_active,
        }
    }
}

/// Per-fighter view handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub hp: Option<f32>,
    pub max_hp: Option<f32>,
    /// Lancer blade tip / Shuriken center
    pub tip: Vec2,
}

impl FighterSnapshot {
    fn of(fighter: &Fighter) -> Self {
        Self {
            side: fighter.side(),
            pos: fighter.body.pos,
            vel: fighter.body.vel,
            angle: fighter.angle,
            radius: fighter.body.radius,
            hp: fighter.body.health.map(|h| h.hp),
            max_hp: fighter.body.health.map(|h| h.max_hp),
            tip: fighter.tip_position(),
        }
    }
}

/// Everything presentation needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub lancer: FighterSnapshot,
    pub shuriken: FighterSnapshot,
    pub stats: MatchStats,
    pub phase: MatchPhase,
    pub simulation_time: f32,
    pub slow_motion: bool,
    pub focus_active: bool,
}

impl MatchSnapshot {
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            MatchPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}
