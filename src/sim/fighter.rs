//! The two combatants: a kinematic body plus a role
//!
//! The Lancer steers its blade along its velocity; the Shuriken just spins.
//! Role data that only matters for drawing (spike count, blade length) is
//! carried here so the presentation layer can read it from snapshots.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::body::{Body, BodySpec};
use crate::settings::FighterTuning;
use crate::{clamp, mix, rand_range, wrap_angle};

/// Which fighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Lancer,
    Shuriken,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Lancer => Side::Shuriken,
            Side::Shuriken => Side::Lancer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Lancer => "Lancer",
            Side::Shuriken => "Shuriken",
        }
    }
}

/// Below this speed the Lancer stops steering and its turn rate decays
const ALIGN_MIN_SPEED: f32 = 10.0;
/// Turn rate (rad/s) at rest and at full speed
const TURN_RATE_SLOW: f32 = 4.2;
const TURN_RATE_FAST: f32 = 6.6;
/// Speed at which the turn rate saturates
const TURN_RATE_FULL_SPEED: f32 = 480.0;
const MAX_ANGULAR_VEL: f32 = 6.0;
/// How fast turn assist fades back to zero (per second)
const TURN_ASSIST_DECAY: f32 = 2.2;
const TURN_ASSIST_LIMIT: f32 = 1.2;

/// Spin decays by this factor per 1/60 s
const SPIN_DECAY: f32 = 0.995;
const MAX_SPIN: f32 = 24.0;
const SPIN_KICK_PER_CLOSING: f32 = 0.015;
const MAX_SPIN_KICK: f32 = 8.0;

/// Role-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatRole {
    Lancer {
        /// Extra heading bias injected by bounces and hits, fades over time
        turn_assist: f32,
        angular_vel: f32,
        /// Distance from the body center to the blade tip
        tip_offset: f32,
    },
    Shuriken {
        /// Angular velocity (rad/s)
        spin: f32,
        spikes: u8,
    },
}

/// A fighter entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub body: Body,
    /// Facing angle (radians)
    pub angle: f32,
    pub role: CombatRole,
}

impl Fighter {
    /// Spawn the Lancer at its fixed arena fraction with a random heading
    pub fn lancer<R: Rng + ?Sized>(arena: &Arena, tuning: &FighterTuning, rng: &mut R) -> Self {
        Self {
            body: spawn_body(arena, tuning, rng),
            angle: -std::f32::consts::FRAC_PI_4,
            role: CombatRole::Lancer {
                turn_assist: 0.0,
                angular_vel: 0.0,
                tip_offset: tuning.tip_offset,
            },
        }
    }

    /// Spawn the Shuriken with a random spin and facing
    pub fn shuriken<R: Rng + ?Sized>(arena: &Arena, tuning: &FighterTuning, rng: &mut R) -> Self {
        let body = spawn_body(arena, tuning, rng);
        let spin = rand_range(rng, tuning.spin_range.0, tuning.spin_range.1);
        let angle = rand_range(rng, 0.0, std::f32::consts::TAU);
        Self {
            body,
            angle,
            role: CombatRole::Shuriken {
                spin,
                spikes: tuning.spikes,
            },
        }
    }

    pub fn side(&self) -> Side {
        match self.role {
            CombatRole::Lancer { .. } => Side::Lancer,
            CombatRole::Shuriken { .. } => Side::Shuriken,
        }
    }

    /// Blade tip in world space (the body center for the Shuriken)
    pub fn tip_position(&self) -> Vec2 {
        match self.role {
            CombatRole::Lancer { tip_offset, .. } => {
                self.body.pos + Vec2::from_angle(self.angle) * tip_offset
            }
            CombatRole::Shuriken { .. } => self.body.pos,
        }
    }

    /// Per-frame orientation update: the Lancer turns toward its velocity,
    /// the Shuriken spins down.
    pub fn update_orientation(&mut self, dt: f32) {
        let speed = self.body.speed();
        let vel = self.body.vel;
        match &mut self.role {
            CombatRole::Lancer {
                turn_assist,
                angular_vel,
                ..
            } => {
                if speed < ALIGN_MIN_SPEED {
                    *angular_vel *= 0.6f32.powf(dt * 60.0);
                    return;
                }
                let target = vel.y.atan2(vel.x) + *turn_assist;
                let delta = wrap_angle(target - self.angle);
                let max_turn = mix(
                    TURN_RATE_SLOW,
                    TURN_RATE_FAST,
                    clamp(speed / TURN_RATE_FULL_SPEED, 0.0, 1.0),
                );
                self.angle += clamp(delta, -max_turn * dt, max_turn * dt);
                *angular_vel = clamp(*angular_vel + delta * dt, -MAX_ANGULAR_VEL, MAX_ANGULAR_VEL);
                *turn_assist = mix(*turn_assist, 0.0, dt * TURN_ASSIST_DECAY);
            }
            CombatRole::Shuriken { spin, .. } => {
                self.angle += *spin * dt;
                *spin = clamp(*spin * SPIN_DECAY.powf(dt * 60.0), -MAX_SPIN, MAX_SPIN);
            }
        }
    }

    /// Secondary wobble after hitting a wall
    pub fn on_wall_bounce<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match &mut self.role {
            CombatRole::Lancer { turn_assist, .. } => {
                *turn_assist += rand_range(rng, -0.6, 0.6);
            }
            CombatRole::Shuriken { spin, .. } => {
                *spin += rand_range(rng, -2.5, 2.5);
            }
        }
    }

    /// React to a contact with the other fighter.
    ///
    /// `normal` points from the Lancer toward the Shuriken and
    /// `relative_normal_velocity` is negative while closing.
    pub fn on_contact(&mut self, normal: Vec2, relative_normal_velocity: f32) {
        match &mut self.role {
            CombatRole::Lancer { turn_assist, .. } => {
                *turn_assist += clamp(
                    normal.x * 0.3 - normal.y * 0.5,
                    -TURN_ASSIST_LIMIT,
                    TURN_ASSIST_LIMIT,
                );
            }
            CombatRole::Shuriken { spin, .. } => {
                *spin += clamp(
                    -relative_normal_velocity * SPIN_KICK_PER_CLOSING,
                    -MAX_SPIN_KICK,
                    MAX_SPIN_KICK,
                );
            }
        }
    }

    pub fn spin(&self) -> Option<f32> {
        match self.role {
            CombatRole::Shuriken { spin, .. } => Some(spin),
            CombatRole::Lancer { .. } => None,
        }
    }

    pub fn turn_assist(&self) -> Option<f32> {
        match self.role {
            CombatRole::Lancer { turn_assist, .. } => Some(turn_assist),
            CombatRole::Shuriken { .. } => None,
        }
    }
}

fn spawn_body<R: Rng + ?Sized>(arena: &Arena, tuning: &FighterTuning, rng: &mut R) -> Body {
    let (fx, fy) = tuning.spawn_fraction;
    let vel = Vec2::new(
        rand_range(rng, tuning.vx_range.0, tuning.vx_range.1),
        rand_range(rng, tuning.vy_range.0, tuning.vy_range.1),
    );
    Body::from_valid(BodySpec {
        pos: arena.point_at(fx, fy),
        vel,
        ..tuning.body_spec()
    })
}
