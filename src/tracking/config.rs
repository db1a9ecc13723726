//! Engine configuration.
//!
//! The fields here are the externally-editable surface of the pose engine.
//! `transform_offset`, `enable_lerp`, `lerp_intensity` and
//! `translation_multiplier` may be changed at runtime through
//! [`crate::tracking::PoseEngine::config_mut`]; the start offset location is
//! set once through its own operation.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Pose;

/// Configuration error raised by [`EngineConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("lerp_intensity must be finite and non-negative, got {0}")]
    InvalidLerpIntensity(f64),
    #[error("translation_multiplier must have finite components")]
    NonFiniteMultiplier,
    #[error("transform_offset must have finite components")]
    NonFiniteOffset,
}

/// Tunable parameters of the pose smoothing & offset engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smooth the virtual transform towards its target over render ticks.
    pub enable_lerp: bool,

    /// Exponential smoothing rate (1/s). Higher converges faster; the
    /// per-tick blend factor is `1 - exp(-lerp_intensity * dt)`, so the
    /// result is independent of tick granularity.
    pub lerp_intensity: f64,

    /// Per-axis scale converting real-world motion into scene motion,
    /// applied in scene frame after axis conversion.
    pub translation_multiplier: Vector3<f64>,

    /// Constant offset applied on top of the real transform. Mutated
    /// externally (e.g. by a repositioning tool) and by the unfreeze fold.
    pub transform_offset: Pose,

    /// Fold the rotation accumulated during a freeze into the offset when
    /// unfreezing. Translation is always folded.
    pub use_rotation_offset: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_lerp: false,
            lerp_intensity: 10.0,
            translation_multiplier: Vector3::new(1.0, 1.0, 1.0),
            transform_offset: Pose::identity(),
            use_rotation_offset: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.lerp_intensity.is_finite() || self.lerp_intensity < 0.0 {
            return Err(ConfigError::InvalidLerpIntensity(self.lerp_intensity));
        }
        if !self.translation_multiplier.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::NonFiniteMultiplier);
        }
        if !self.transform_offset.is_finite() {
            return Err(ConfigError::NonFiniteOffset);
        }
        Ok(())
    }
}
