//! Kinematic body shared by both fighters
//!
//! A point mass with a collision circle. Integration, impulses and the
//! minimum-speed kick live here; walls and the other fighter live elsewhere.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::DRAG_REFERENCE_HZ;
use crate::error::ConfigError;
use crate::rand_range;

/// Hit points of a health-bearing body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hp: f32,
    pub max_hp: f32,
}

impl Health {
    pub fn full(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Construction parameters for a [`Body`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: f32,
    /// Velocity multiplier per 1/60 s
    pub drag: f32,
    pub radius: f32,
    /// Defaults to `radius` when `None`
    pub collision_radius: Option<f32>,
    /// `None` for pure-physics rulesets
    pub max_hp: Option<f32>,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            mass: 1.0,
            drag: 0.998,
            radius: 30.0,
            collision_radius: None,
            max_hp: None,
        }
    }
}

/// A kinematic body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    mass: f32,
    pub drag: f32,
    pub radius: f32,
    pub collision_radius: f32,
    pub health: Option<Health>,
}

impl Body {
    /// Build a body, rejecting non-positive mass/radius and drag outside (0, 1]
    pub fn new(spec: BodySpec) -> Result<Self, ConfigError> {
        Self::validate(&spec, "body")?;
        Ok(Self::from_valid(spec))
    }

    pub(crate) fn validate(spec: &BodySpec, what: &'static str) -> Result<(), ConfigError> {
        if !(spec.mass.is_finite() && spec.mass > 0.0) {
            return Err(ConfigError::NonPositiveMass {
                what,
                mass: spec.mass,
            });
        }
        let collision_radius = spec.collision_radius.unwrap_or(spec.radius);
        for radius in [spec.radius, collision_radius] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::NonPositiveRadius { what, radius });
            }
        }
        if !(spec.drag > 0.0 && spec.drag <= 1.0) {
            return Err(ConfigError::DragOutOfRange {
                what,
                drag: spec.drag,
            });
        }
        if let Some(hp) = spec.max_hp {
            if !(hp.is_finite() && hp > 0.0) {
                return Err(ConfigError::NonPositiveHealth { what, hp });
            }
        }
        Ok(())
    }

    /// Build from a spec that already passed [`Body::validate`]
    pub(crate) fn from_valid(spec: BodySpec) -> Self {
        Self {
            pos: spec.pos,
            vel: spec.vel,
            mass: spec.mass,
            drag: spec.drag,
            radius: spec.radius,
            collision_radius: spec.collision_radius.unwrap_or(spec.radius),
            health: spec.max_hp.map(Health::full),
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Advance position, then decay velocity frame-rate independently
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= self.drag.powf(dt * DRAG_REFERENCE_HZ);
    }

    /// `vel += impulse / mass`; the caller scales the impulse
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.vel += impulse / self.mass;
    }

    /// Raise speed to `min_speed` keeping direction; a body at rest gets a
    /// uniformly random heading. Never slows a body down.
    pub fn ensure_minimum_speed<R: Rng + ?Sized>(&mut self, min_speed: f32, rng: &mut R) {
        let speed = self.speed();
        if speed >= min_speed {
            return;
        }
        if speed == 0.0 {
            let angle = rand_range(rng, 0.0, std::f32::consts::TAU);
            self.vel = Vec2::from_angle(angle) * min_speed;
            return;
        }
        self.vel *= min_speed / speed;
    }

    /// Subtract hit points, clamped to [0, max_hp]. No-op without health.
    pub fn take_damage(&mut self, amount: f32) {
        if let Some(health) = self.health.as_mut() {
            health.hp = (health.hp - amount).clamp(0.0, health.max_hp);
        }
    }

    /// True once hit points reach zero (never for bodies without health)
    pub fn is_defeated(&self) -> bool {
        self.health.is_some_and(|h| h.is_depleted())
    }

    pub fn hp(&self) -> Option<f32> {
        self.health.map(|h| h.hp)
    }
}
