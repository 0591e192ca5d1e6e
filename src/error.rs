//! Configuration errors
//!
//! The simulation itself never fails at runtime; every numeric edge case is a
//! guarded no-op. Bad tuning is the only error and is rejected up front.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{what}: mass must be positive and finite, got {mass}")]
    NonPositiveMass { what: &'static str, mass: f32 },

    #[error("{what}: radius must be positive and finite, got {radius}")]
    NonPositiveRadius { what: &'static str, radius: f32 },

    #[error("{what}: drag must be in (0, 1], got {drag}")]
    DragOutOfRange { what: &'static str, drag: f32 },

    #[error("{what}: health must be positive, got {hp}")]
    NonPositiveHealth { what: &'static str, hp: f32 },

    #[error("arena too small: {width}x{height} cannot hold both fighters")]
    DegenerateArena { width: f32, height: f32 },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidTuning { name: &'static str, value: f32 },

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reject negative or non-finite tuning values
pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidTuning { name, value })
    }
}
