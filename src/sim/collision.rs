//! Pairwise collision detection and impulse response
//!
//! Two geometries are supported: body circle against body circle, and the
//! Lancer's blade tip (a point) against the other body's circle. Both feed the
//! same impulse solve along the contact normal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::consts::*;
use crate::error::{ConfigError, non_negative};

/// How overlap between the two fighters is detected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CollisionGeometry {
    /// Overlap when `dist < r1 + r2 - slop`
    CircleCircle { slop: f32 },
    /// Overlap when `dist(tip, other) < other_radius * reach_factor`
    TipPoint { reach_factor: f32 },
}

impl Default for CollisionGeometry {
    fn default() -> Self {
        CollisionGeometry::CircleCircle { slop: 0.0 }
    }
}

impl CollisionGeometry {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            CollisionGeometry::CircleCircle { slop } => non_negative("geometry.slop", slop)?,
            CollisionGeometry::TipPoint { reach_factor } => {
                non_negative("geometry.reach_factor", reach_factor)?
            }
        };
        Ok(())
    }
}

/// Impulse solve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionTuning {
    /// Values above 1.0 inject energy
    pub restitution: f32,
    /// Floor on the impulse magnitude so every hit visibly knocks back
    pub min_impulse: f32,
    /// Extra separation added to the penetration depth
    pub separation_bias: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            restitution: RESTITUTION,
            min_impulse: MIN_IMPULSE,
            separation_bias: SEPARATION_BIAS,
        }
    }
}

impl CollisionTuning {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        non_negative("restitution", self.restitution)?;
        non_negative("min_impulse", self.min_impulse)?;
        non_negative("separation_bias", self.separation_bias)?;
        Ok(())
    }
}

/// Damage dealt by a scored hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DamageModel {
    /// `clamp(closing / divisor, min, max)`
    ImpactScaled { divisor: f32, min: f32, max: f32 },
    /// `max(base + closing * per_closing, floor)`
    Combo {
        base: f32,
        per_closing: f32,
        floor: f32,
    },
}

impl Default for DamageModel {
    fn default() -> Self {
        DamageModel::ImpactScaled {
            divisor: 200.0,
            min: 0.5,
            max: 2.0,
        }
    }
}

impl DamageModel {
    /// Damage for a hit closing at `closing_speed`
    pub fn damage(&self, closing_speed: f32) -> f32 {
        match *self {
            DamageModel::ImpactScaled { divisor, min, max } => {
                crate::clamp(closing_speed / divisor, min, max)
            }
            DamageModel::Combo {
                base,
                per_closing,
                floor,
            } => (base + closing_speed * per_closing).max(floor),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            DamageModel::ImpactScaled { divisor, min, max } => {
                if !(divisor.is_finite() && divisor > 0.0) {
                    return Err(ConfigError::InvalidTuning {
                        name: "damage.divisor",
                        value: divisor,
                    });
                }
                non_negative("damage.min", min)?;
                non_negative("damage.max", max)?;
                if max < min {
                    return Err(ConfigError::InvalidTuning {
                        name: "damage.max",
                        value: max,
                    });
                }
            }
            DamageModel::Combo {
                base,
                per_closing,
                floor,
            } => {
                non_negative("damage.base", base)?;
                non_negative("damage.per_closing", per_closing)?;
                non_negative("damage.floor", floor)?;
            }
        }
        Ok(())
    }
}

/// Outcome of an impulse exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from A toward B
    pub normal: Vec2,
    /// `v_b·n - v_a·n` before the impulse (negative while closing)
    pub relative_normal_velocity: f32,
    /// Magnitude of the impulse applied along the normal
    pub impulse: f32,
    /// How hard A was driving into the contact: `max(0, v_a·n)`
    pub pressure_a: f32,
    /// How hard B was driving into the contact: `max(0, -v_b·n)`
    pub pressure_b: f32,
}

impl Contact {
    #[inline]
    pub fn closing_speed(&self) -> f32 {
        -self.relative_normal_velocity
    }
}

/// Which side of a contact takes damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    A,
    B,
    Both,
}

impl HitTarget {
    pub fn hits_a(self) -> bool {
        matches!(self, HitTarget::A | HitTarget::Both)
    }

    pub fn hits_b(self) -> bool {
        matches!(self, HitTarget::B | HitTarget::Both)
    }
}

/// The side pushing harder by more than `margin` deals the damage; otherwise
/// both sides take it.
pub fn classify_hit(contact: &Contact, margin: f32) -> HitTarget {
    if contact.pressure_a > contact.pressure_b + margin {
        HitTarget::B
    } else if contact.pressure_b > contact.pressure_a + margin {
        HitTarget::A
    } else {
        HitTarget::Both
    }
}

/// Circle-circle overlap: unit normal (A toward B) and penetration depth
pub fn circle_overlap(a: &Body, b: &Body, slop: f32) -> Option<(Vec2, f32)> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.collision_radius + b.collision_radius - slop;
    if dist == 0.0 || dist >= min_dist {
        return None;
    }
    Some((delta / dist, a.collision_radius + b.collision_radius - dist))
}

/// Point-circle overlap: unit normal from `tip` toward B
pub fn tip_overlap(tip: Vec2, b: &Body, reach_factor: f32) -> Option<Vec2> {
    let delta = b.pos - tip;
    let dist = delta.length();
    if dist == 0.0 || dist >= b.collision_radius * reach_factor {
        return None;
    }
    Some(delta / dist)
}

/// Detect and resolve a contact between A and B.
///
/// `tip_a` is A's weapon tip, only consulted for [`CollisionGeometry::TipPoint`].
/// Circle contacts are separated positionally first. Returns `None` when the
/// bodies don't overlap or are already separating; otherwise the impulse has
/// been applied to both.
pub fn resolve_pair(
    a: &mut Body,
    b: &mut Body,
    tip_a: Vec2,
    geometry: &CollisionGeometry,
    tuning: &CollisionTuning,
) -> Option<Contact> {
    let normal = match *geometry {
        CollisionGeometry::CircleCircle { slop } => {
            let (normal, penetration) = circle_overlap(a, b, slop)?;
            separate(a, b, normal, penetration + tuning.separation_bias);
            normal
        }
        CollisionGeometry::TipPoint { reach_factor } => tip_overlap(tip_a, b, reach_factor)?,
    };

    let va = a.vel.dot(normal);
    let vb = b.vel.dot(normal);
    let relative = vb - va;
    if relative >= 0.0 {
        return None;
    }

    let inv_mass_sum = 1.0 / a.mass() + 1.0 / b.mass();
    let impulse = (-(1.0 + tuning.restitution) * relative / inv_mass_sum).max(tuning.min_impulse);

    a.apply_impulse(-normal * impulse);
    b.apply_impulse(normal * impulse);

    Some(Contact {
        normal,
        relative_normal_velocity: relative,
        impulse,
        pressure_a: va.max(0.0),
        pressure_b: (-vb).max(0.0),
    })
}

/// Push A and B apart along `normal`, each by the other's share of the mass
fn separate(a: &mut Body, b: &mut Body, normal: Vec2, depth: f32) {
    let correction = depth / (a.mass() + b.mass());
    let (ma, mb) = (a.mass(), b.mass());
    a.pos -= normal * correction * mb;
    b.pos += normal * correction * ma;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodySpec;

    fn disc(pos: Vec2, vel: Vec2, mass: f32, radius: f32) -> Body {
        Body::new(BodySpec {
            pos,
            vel,
            mass,
            drag: 1.0,
            radius,
            ..Default::default()
        })
        .unwrap()
    }

    const CIRCLE: CollisionGeometry = CollisionGeometry::CircleCircle { slop: 0.0 };

    #[test]
    fn test_head_on_equal_masses_swap_velocities() {
        let mut a = disc(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0), 1.0, 30.0);
        let mut b = disc(Vec2::new(150.0, 100.0), Vec2::new(-100.0, 0.0), 1.0, 30.0);
        let tuning = CollisionTuning {
            restitution: 1.0,
            ..Default::default()
        };

        let tip_a = a.pos;

        let contact = resolve_pair(&mut a, &mut b, tip_a, &CIRCLE, &tuning).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert_eq!(contact.closing_speed(), 200.0);
        assert!((a.vel - Vec2::new(-100.0, 0.0)).length() < 1e-4);
        assert!((b.vel - Vec2::new(100.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_positional_correction_separates_by_mass() {
        let mut a = disc(Vec2::new(100.0, 100.0), Vec2::new(50.0, 0.0), 3.0, 30.0);
        let mut b = disc(Vec2::new(150.0, 100.0), Vec2::ZERO, 1.0, 30.0);
        let tuning = CollisionTuning {
            separation_bias: 0.0,
            ..Default::default()
        };

        let tip_a = a.pos;

        resolve_pair(&mut a, &mut b, tip_a, &CIRCLE, &tuning).unwrap();
        // Penetration 10, the lighter body moves three times as far
        assert!((a.pos.x - 97.5).abs() < 1e-4);
        assert!((b.pos.x - 157.5).abs() < 1e-4);
        assert!((b.pos - a.pos).length() >= 60.0 - 1e-3);
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let mut a = disc(Vec2::new(100.0, 100.0), Vec2::new(-80.0, 0.0), 1.0, 30.0);
        let mut b = disc(Vec2::new(150.0, 100.0), Vec2::new(80.0, 0.0), 1.0, 30.0);

        let tip_a = a.pos;

        let contact = resolve_pair(&mut a, &mut b, tip_a, &CIRCLE, &CollisionTuning::default());
        assert!(contact.is_none());
        assert_eq!(a.vel, Vec2::new(-80.0, 0.0));
        assert_eq!(b.vel, Vec2::new(80.0, 0.0));
    }

    #[test]
    fn test_coincident_centers_are_ignored() {
        let mut a = disc(Vec2::new(100.0, 100.0), Vec2::new(50.0, 0.0), 1.0, 30.0);
        let mut b = disc(Vec2::new(100.0, 100.0), Vec2::new(-50.0, 0.0), 1.0, 30.0);

        let tuning = CollisionTuning::default();
        let tip_a = a.pos;
        assert!(resolve_pair(&mut a, &mut b, tip_a, &CIRCLE, &tuning).is_none());
        assert!(a.pos.is_finite() && a.vel.is_finite());
        assert_eq!(a.pos, b.pos);
    }

    #[test]
    fn test_slop_requires_deeper_overlap() {
        let a = disc(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0, 30.0);
        let b = disc(Vec2::new(157.0, 100.0), Vec2::ZERO, 1.0, 30.0);
        assert!(circle_overlap(&a, &b, 0.0).is_some());
        assert!(circle_overlap(&a, &b, 4.0).is_none());
    }

    #[test]
    fn test_min_impulse_floor() {
        let mut a = disc(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 1.0, 30.0);
        let mut b = disc(Vec2::new(150.0, 100.0), Vec2::ZERO, 1.0, 30.0);

        let tuning = CollisionTuning::default();
        let tip_a = a.pos;
        let contact = resolve_pair(&mut a, &mut b, tip_a, &CIRCLE, &tuning).unwrap();
        assert_eq!(contact.impulse, MIN_IMPULSE);
        assert!((b.vel.x - MIN_IMPULSE).abs() < 1e-4);
    }

    #[test]
    fn test_swapping_roles_gives_equal_and_opposite_impulses() {
        let a0 = disc(Vec2::new(200.0, 210.0), Vec2::new(140.0, -30.0), 1.4, 34.0);
        let b0 = disc(Vec2::new(250.0, 180.0), Vec2::new(-90.0, 60.0), 1.0, 32.0);
        let tuning = CollisionTuning::default();

        let (mut a1, mut b1) = (a0.clone(), b0.clone());
        let tip_a1 = a1.pos;
        let forward = resolve_pair(&mut a1, &mut b1, tip_a1, &CIRCLE, &tuning).unwrap();

        let (mut a2, mut b2) = (a0.clone(), b0.clone());
        let tip_b2 = b2.pos;
        let swapped = resolve_pair(&mut b2, &mut a2, tip_b2, &CIRCLE, &tuning).unwrap();

        assert!((forward.normal + swapped.normal).length() < 1e-5);
        assert!((forward.impulse - swapped.impulse).abs() < 1e-3);
        assert!((a1.vel - a2.vel).length() < 1e-3);
        assert!((b1.vel - b2.vel).length() < 1e-3);
        assert!((a1.pos - a2.pos).length() < 1e-3);

        // Momentum is conserved
        let before = a0.vel * a0.mass() + b0.vel * b0.mass();
        let after = a1.vel * a1.mass() + b1.vel * b1.mass();
        assert!((before - after).length() < 1e-2);
    }

    #[test]
    fn test_tip_point_contact() {
        let mut lancer = disc(Vec2::new(100.0, 100.0), Vec2::new(200.0, 0.0), 1.4, 34.0);
        let mut target = disc(Vec2::new(230.0, 100.0), Vec2::ZERO, 1.0, 32.0);
        let geometry = CollisionGeometry::TipPoint { reach_factor: 0.9 };

        // Tip 108 ahead puts it 22 from the target center, inside 28.8
        let tip = lancer.pos + Vec2::X * 108.0;
        let before = (lancer.pos, target.pos);
        let tuning = CollisionTuning::default();
        let contact = resolve_pair(&mut lancer, &mut target, tip, &geometry, &tuning).unwrap();

        assert_eq!(contact.normal, Vec2::X);
        assert_eq!((lancer.pos, target.pos), before);
        assert!(target.vel.x > 0.0);
        assert!(lancer.vel.x < 200.0);

        // Out of reach
        let mut far = disc(Vec2::new(240.0, 100.0), Vec2::ZERO, 1.0, 32.0);
        let tip = lancer.pos + Vec2::X * 108.0;
        assert!(tip_overlap(tip, &far, 0.9).is_none());
        assert!(resolve_pair(&mut lancer, &mut far, tip, &geometry, &tuning).is_none());
    }

    #[test]
    fn test_classify_hit() {
        let contact = |pressure_a, pressure_b| Contact {
            normal: Vec2::X,
            relative_normal_velocity: -100.0,
            impulse: 100.0,
            pressure_a,
            pressure_b,
        };
        assert_eq!(classify_hit(&contact(100.0, 0.0), 4.0), HitTarget::B);
        assert_eq!(classify_hit(&contact(0.0, 100.0), 4.0), HitTarget::A);
        assert_eq!(classify_hit(&contact(50.0, 47.0), 4.0), HitTarget::Both);
        assert!(HitTarget::Both.hits_a() && HitTarget::Both.hits_b());
        assert!(!HitTarget::A.hits_b());
    }

    #[test]
    fn test_damage_models() {
        let impact = DamageModel::default();
        assert_eq!(impact.damage(40.0), 0.5);
        assert_eq!(impact.damage(300.0), 1.5);
        assert_eq!(impact.damage(1000.0), 2.0);

        let combo = DamageModel::Combo {
            base: 8.0,
            per_closing: 0.2,
            floor: 5.0,
        };
        assert_eq!(combo.damage(100.0), 28.0);
        assert_eq!(combo.damage(-50.0), 5.0);
    }
}
