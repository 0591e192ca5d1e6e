//! Match settings and ruleset presets
//!
//! Every tunable of the engine lives here. Settings load from JSON as a set
//! of overrides on top of a ruleset preset (Classic unless `preset` is given).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::*;
use crate::error::{ConfigError, non_negative};
use crate::sim::arena::{Arena, WallBounce};
use crate::sim::body::{Body, BodySpec};
use crate::sim::collision::{CollisionGeometry, CollisionTuning, DamageModel};
use crate::sim::fighter::Side;

/// Ruleset presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RulesetPreset {
    /// Body-vs-body hits, impact-scaled damage, short health bars
    #[default]
    Classic,
    /// Blade-tip hits, combo damage, energetic restitution
    Arcade,
    /// Pure physics: no health, no outcome
    Sandbox,
}

impl RulesetPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulesetPreset::Classic => "Classic",
            RulesetPreset::Arcade => "Arcade",
            RulesetPreset::Sandbox => "Sandbox",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(RulesetPreset::Classic),
            "arcade" | "combo" => Some(RulesetPreset::Arcade),
            "sandbox" | "physics" => Some(RulesetPreset::Sandbox),
            _ => None,
        }
    }
}

/// Per-fighter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterTuning {
    pub mass: f32,
    pub drag: f32,
    /// Visual radius
    pub radius: f32,
    pub collision_radius: f32,
    /// `None` disables health for this fighter
    pub max_hp: Option<f32>,
    /// Spawn point as a fraction of the arena
    pub spawn_fraction: (f32, f32),
    /// Initial velocity ranges [min, max)
    pub vx_range: (f32, f32),
    pub vy_range: (f32, f32),
    /// Lancer: blade tip distance from center
    pub tip_offset: f32,
    /// Shuriken: initial spin range (rad/s)
    pub spin_range: (f32, f32),
    /// Shuriken: number of points
    pub spikes: u8,
}

impl FighterTuning {
    pub fn lancer() -> Self {
        Self {
            mass: 1.4,
            drag: 0.998,
            radius: 38.0,
            collision_radius: 34.0,
            max_hp: Some(12.0),
            spawn_fraction: (0.72, 0.28),
            vx_range: (-260.0, -140.0),
            vy_range: (120.0, 220.0),
            tip_offset: 108.0,
            spin_range: (0.0, 0.0),
            spikes: 0,
        }
    }

    pub fn shuriken() -> Self {
        Self {
            mass: 1.0,
            drag: 0.998,
            radius: 38.0,
            collision_radius: 32.0,
            max_hp: Some(10.0),
            spawn_fraction: (0.32, 0.62),
            vx_range: (220.0, 320.0),
            vy_range: (-220.0, -140.0),
            tip_offset: 0.0,
            spin_range: (6.0, 9.0),
            spikes: 5,
        }
    }

    /// Body parameters without position/velocity
    pub fn body_spec(&self) -> BodySpec {
        BodySpec {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            mass: self.mass,
            drag: self.drag,
            radius: self.radius,
            collision_radius: Some(self.collision_radius),
            max_hp: self.max_hp,
        }
    }

    fn validate(&self, what: &'static str) -> Result<(), ConfigError> {
        Body::validate(&self.body_spec(), what)?;
        non_negative("tip_offset", self.tip_offset)?;
        for (name, range) in [
            ("vx_range", self.vx_range),
            ("vy_range", self.vy_range),
            ("spin_range", self.spin_range),
        ] {
            if !(range.1 - range.0).is_finite() {
                return Err(ConfigError::InvalidTuning {
                    name,
                    value: if range.0.is_finite() { range.1 } else { range.0 },
                });
            }
        }
        Ok(())
    }
}

/// Pairwise collision and damage tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    pub geometry: CollisionGeometry,
    pub collision: CollisionTuning,
    pub damage: DamageModel,
    /// Seconds between damaging hits
    pub hit_cooldown: f32,
    /// Pressure lead needed for a one-sided hit
    pub pressure_margin: f32,
    /// Seconds a combo stays alive after a hit
    pub combo_window: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            geometry: CollisionGeometry::default(),
            collision: CollisionTuning::default(),
            damage: DamageModel::default(),
            hit_cooldown: HIT_COOLDOWN,
            pressure_margin: PRESSURE_MARGIN,
            combo_window: COMBO_WINDOW,
        }
    }
}

/// Focus slow-field and energy pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTuning {
    pub energy_max: f32,
    /// Passive regeneration per second while focus is off
    pub energy_regen: f32,
    /// Energy spent per second while focus is on
    pub drain: f32,
    /// Opponent velocity multiplier per 1/60 s while focus is on
    pub damping: f32,
    /// Fighter the player steers; focus slows the other one
    pub controlled: Side,
    /// Impulse of a pointer nudge
    pub nudge_impulse: f32,
}

impl Default for FocusTuning {
    fn default() -> Self {
        Self {
            energy_max: ENERGY_MAX,
            energy_regen: ENERGY_REGEN,
            drain: FOCUS_DRAIN,
            damping: FOCUS_DAMPING,
            controlled: Side::Lancer,
            nudge_impulse: NUDGE_IMPULSE,
        }
    }
}

/// Integration-level tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsTuning {
    pub wall: WallBounce,
    /// Speed floor enforced at the end of every frame
    pub min_speed: f32,
    /// Time scale while slow motion is on
    pub slow_motion_scale: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            wall: WallBounce::default(),
            min_speed: MIN_SPEED,
            slow_motion_scale: SLOW_MOTION_SCALE,
        }
    }
}

/// Complete match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub preset: RulesetPreset,
    pub arena: Arena,
    pub physics: PhysicsTuning,
    pub combat: CombatTuning,
    pub focus: FocusTuning,
    pub lancer: FighterTuning,
    pub shuriken: FighterTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: RulesetPreset::Classic,
            arena: Arena::default(),
            physics: PhysicsTuning::default(),
            combat: CombatTuning::default(),
            focus: FocusTuning::default(),
            lancer: FighterTuning::lancer(),
            shuriken: FighterTuning::shuriken(),
        }
    }
}

impl Settings {
    /// Create settings from a ruleset preset
    pub fn from_preset(preset: RulesetPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a ruleset preset (overwrites the tunables it covers)
    pub fn apply_preset(&mut self, preset: RulesetPreset) {
        self.preset = preset;
        self.physics.wall = WallBounce::default();
        self.combat = CombatTuning::default();
        self.lancer.tip_offset = FighterTuning::lancer().tip_offset;
        match preset {
            RulesetPreset::Classic => {
                self.lancer.max_hp = Some(12.0);
                self.shuriken.max_hp = Some(10.0);
            }
            RulesetPreset::Arcade => {
                self.physics.wall.elasticity = 1.02;
                self.combat.geometry = CollisionGeometry::TipPoint { reach_factor: 0.9 };
                self.combat.collision.restitution = 1.05;
                self.combat.collision.min_impulse = 40.0;
                self.combat.damage = DamageModel::Combo {
                    base: 8.0,
                    per_closing: 0.2,
                    floor: 5.0,
                };
                self.lancer.tip_offset = 100.0;
                self.lancer.max_hp = Some(100.0);
                self.shuriken.max_hp = Some(100.0);
            }
            RulesetPreset::Sandbox => {
                self.physics.wall.speed_cap = None;
                self.combat.collision.restitution = 1.0;
                self.lancer.max_hp = None;
                self.shuriken.max_hp = None;
            }
        }
    }

    /// True when at least one fighter can lose
    pub fn health_enabled(&self) -> bool {
        self.lancer.max_hp.is_some() || self.shuriken.max_hp.is_some()
    }

    /// Reject tuning the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lancer.validate("lancer")?;
        self.shuriken.validate("shuriken")?;

        let widest = self.lancer.collision_radius.max(self.shuriken.collision_radius) * 2.0;
        if !(self.arena.width > widest && self.arena.height > widest) {
            return Err(ConfigError::DegenerateArena {
                width: self.arena.width,
                height: self.arena.height,
            });
        }

        let wall = &self.physics.wall;
        non_negative("wall.elasticity", wall.elasticity)?;
        non_negative("wall.min_rebound", wall.min_rebound)?;
        // Sampled from [-jitter, jitter), so the span must stay finite too
        if !(non_negative("wall.jitter", wall.jitter)? * 2.0).is_finite() {
            return Err(ConfigError::InvalidTuning {
                name: "wall.jitter",
                value: wall.jitter,
            });
        }
        if let Some(cap) = wall.speed_cap {
            non_negative("wall.speed_cap", cap)?;
        }
        non_negative("min_speed", self.physics.min_speed)?;
        non_negative("slow_motion_scale", self.physics.slow_motion_scale)?;

        let combat = &self.combat;
        combat.geometry.validate()?;
        combat.collision.validate()?;
        combat.damage.validate()?;
        non_negative("hit_cooldown", combat.hit_cooldown)?;
        non_negative("pressure_margin", combat.pressure_margin)?;
        non_negative("combo_window", combat.combo_window)?;

        let focus = &self.focus;
        non_negative("energy_max", focus.energy_max)?;
        non_negative("energy_regen", focus.energy_regen)?;
        non_negative("focus.drain", focus.drain)?;
        non_negative("focus.damping", focus.damping)?;
        non_negative("nudge_impulse", focus.nudge_impulse)?;
        Ok(())
    }

    /// Parse and validate settings from JSON overrides
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: Value = serde_json::from_str(json)?;
        let preset = match overrides.get("preset") {
            Some(preset) => serde_json::from_value(preset.clone())?,
            None => RulesetPreset::default(),
        };

        let mut merged = serde_json::to_value(Self::from_preset(preset))?;
        merge_json(&mut merged, overrides);

        let settings: Self = serde_json::from_value(merged)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded {} settings from {}",
            settings.preset.as_str(),
            path.display()
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Deep-merge `overlay` into `base`; non-object values replace wholesale
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names() {
        for preset in [
            RulesetPreset::Classic,
            RulesetPreset::Arcade,
            RulesetPreset::Sandbox,
        ] {
            assert_eq!(RulesetPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(RulesetPreset::from_str("COMBO"), Some(RulesetPreset::Arcade));
        assert_eq!(RulesetPreset::from_str("nope"), None);
    }

    #[test]
    fn test_presets_validate() {
        for preset in [
            RulesetPreset::Classic,
            RulesetPreset::Arcade,
            RulesetPreset::Sandbox,
        ] {
            Settings::from_preset(preset).validate().unwrap();
        }
        assert!(!Settings::from_preset(RulesetPreset::Sandbox).health_enabled());
        assert!(Settings::from_preset(RulesetPreset::Arcade).health_enabled());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "physics": { "min_speed": 150.0 } }"#).unwrap();
        assert_eq!(settings.physics.min_speed, 150.0);
        assert_eq!(settings.physics.wall, WallBounce::default());
        assert_eq!(settings.lancer, FighterTuning::lancer());
        assert_eq!(settings.shuriken, FighterTuning::shuriken());
    }

    #[test]
    fn test_partial_fighter_section_keeps_its_own_defaults() {
        let settings = Settings::from_json(r#"{ "shuriken": { "mass": 2.0 } }"#).unwrap();
        assert_eq!(settings.shuriken.mass, 2.0);
        assert_eq!(settings.shuriken.spikes, 5);
        assert_eq!(settings.shuriken.spawn_fraction, (0.32, 0.62));
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let settings = Settings::from_json(
            r#"{ "preset": "Arcade", "combat": { "collision": { "restitution": 0.9 } } }"#,
        )
        .unwrap();
        assert_eq!(settings.preset, RulesetPreset::Arcade);
        assert_eq!(settings.combat.collision.restitution, 0.9);
        assert_eq!(settings.combat.collision.min_impulse, 40.0);
        assert!(matches!(
            settings.combat.geometry,
            CollisionGeometry::TipPoint { .. }
        ));
        assert_eq!(settings.lancer.max_hp, Some(100.0));
        assert_eq!(settings.lancer.tip_offset, 100.0);
        assert_eq!(Settings::default().lancer.tip_offset, 108.0);
    }

    #[test]
    fn test_preset_switch_replaces_previous_ruleset() {
        let mut settings = Settings::from_preset(RulesetPreset::Arcade);
        settings.apply_preset(RulesetPreset::Sandbox);
        assert_eq!(settings.combat.geometry, CollisionGeometry::default());
        assert_eq!(settings.combat.collision.min_impulse, MIN_IMPULSE);
        assert_eq!(settings.combat.collision.restitution, 1.0);
        assert_eq!(settings.physics.wall.elasticity, WALL_ELASTICITY);
        assert_eq!(settings.physics.wall.speed_cap, None);
        assert_eq!(settings.lancer.tip_offset, 108.0);
        assert!(!settings.health_enabled());

        settings.apply_preset(RulesetPreset::Classic);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_rejects_unsampleable_spans() {
        let err = Settings::from_json(r#"{ "physics": { "wall": { "jitter": 3.0e38 } } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTuning {
                name: "wall.jitter",
                ..
            }
        ));

        let err = Settings::from_json(r#"{ "shuriken": { "vx_range": [-3.0e38, 3.0e38] } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTuning {
                name: "vx_range",
                ..
            }
        ));
    }

    #[test]
    fn test_geometry_variant_override() {
        let settings = Settings::from_json(
            r#"{ "combat": { "geometry": { "kind": "TipPoint", "reach_factor": 0.8 } } }"#,
        )
        .unwrap();
        assert_eq!(
            settings.combat.geometry,
            CollisionGeometry::TipPoint { reach_factor: 0.8 }
        );
    }

    #[test]
    fn test_null_disables_health() {
        let settings = Settings::from_json(r#"{ "lancer": { "max_hp": null } }"#).unwrap();
        assert_eq!(settings.lancer.max_hp, None);
        assert_eq!(settings.shuriken.max_hp, Some(10.0));
    }

    #[test]
    fn test_json_roundtrip_of_preset() {
        let arcade = Settings::from_preset(RulesetPreset::Arcade);
        let json = arcade.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), arcade);
    }

    #[test]
    fn test_rejects_bad_mass() {
        let err = Settings::from_json(r#"{ "lancer": { "mass": -1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositiveMass { what: "lancer", .. }
        ));
    }

    #[test]
    fn test_rejects_tiny_arena() {
        let err = Settings::from_json(
            r#"{ "arena": { "x": 0.0, "y": 0.0, "width": 40.0, "height": 400.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateArena { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Settings::load("/nonexistent/lancer-duel.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
