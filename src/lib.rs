//! Lancer Duel - a two-body arena physics toy
//!
//! Core modules:
//! - `sim`: Simulation (bodies, wall bounces, pairwise collisions, match state)
//! - `frame`: Frame driver that samples time and advances the simulation
//! - `settings`: Data-driven tuning and ruleset presets
//! - `error`: Configuration errors

pub mod error;
pub mod frame;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use frame::{FixedRateSource, FpsMeter, FrameDriver, FrameSource};
pub use settings::{RulesetPreset, Settings};

use rand::Rng;

/// Engine configuration constants
pub mod consts {
    /// Drag coefficients are expressed per frame at this rate
    pub const DRAG_REFERENCE_HZ: f32 = 60.0;
    /// Largest delta a single frame may advance (avoids physics explosions)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Canvas the default arena is inset into
    pub const CANVAS_WIDTH: f32 = 960.0;
    pub const CANVAS_HEIGHT: f32 = 640.0;
    pub const ARENA_INSET: f32 = 70.0;

    /// Bodies slower than this get pushed back up to it every frame
    pub const MIN_SPEED: f32 = 220.0;

    /// Wall bounce defaults
    pub const WALL_ELASTICITY: f32 = 0.92;
    pub const WALL_MIN_REBOUND: f32 = 20.0;
    pub const WALL_JITTER: f32 = 24.0;
    /// Post-bounce speed may exceed the pre-bounce speed by at most 5%
    pub const WALL_SPEED_CAP: f32 = 1.05;

    /// Pairwise collision defaults
    pub const RESTITUTION: f32 = 0.95;
    pub const MIN_IMPULSE: f32 = 20.0;
    pub const SEPARATION_BIAS: f32 = 1.5;

    /// Seconds between two damaging hits
    pub const HIT_COOLDOWN: f32 = 0.2;
    /// Pressure difference needed to call a one-sided hit
    pub const PRESSURE_MARGIN: f32 = 4.0;
    /// Seconds after a hit during which the next one extends the combo
    pub const COMBO_WINDOW: f32 = 1.15;

    /// Focus / energy
    pub const ENERGY_MAX: f32 = 100.0;
    pub const ENERGY_REGEN: f32 = 6.0;
    pub const FOCUS_DRAIN: f32 = 30.0;
    pub const FOCUS_DAMPING: f32 = 0.94;

    /// Time scale while slow motion is on
    pub const SLOW_MOTION_SCALE: f32 = 0.35;
    /// Impulse magnitude of a pointer nudge
    pub const NUDGE_IMPULSE: f32 = 260.0;
}

/// Clamp `v` to `[min, max]`
#[inline]
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.max(min).min(max)
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wrap an angle to [-π, π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Uniform sample from [min, max); returns `min` for an empty range or one
/// whose width overflows
#[inline]
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min < max && (max - min).is_finite() {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        assert!((wrap_angle(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
        for i in -50..50 {
            let a = wrap_angle(i as f32 * 0.77);
            assert!((-PI..PI).contains(&a));
        }
    }

    #[test]
    fn test_mix_and_clamp() {
        assert_eq!(mix(10.0, 20.0, 0.5), 15.0);
        assert_eq!(mix(10.0, 20.0, 0.0), 10.0);
        assert_eq!(clamp(5.0, 0.0, 2.0), 2.0);
        assert_eq!(clamp(-5.0, 0.0, 2.0), 0.0);
    }

    #[test]
    fn test_rand_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let v = rand_range(&mut rng, -24.0, 24.0);
            assert!((-24.0..24.0).contains(&v));
        }
        assert_eq!(rand_range(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(rand_range(&mut rng, -3.0e38, 3.0e38), -3.0e38);
        assert_eq!(rand_range(&mut rng, 0.0, f32::INFINITY), 0.0);
    }
}
