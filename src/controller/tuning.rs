//! Provides [`CamTuning`], the immutable feel settings of the controller.

use std::{f32::consts::FRAC_PI_2, time::Duration};

use bevy_reflect::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sensitivities, damping, limits and timings of the controller.
///
/// Fixed at construction. The defaults are tuned so a strong flick spins the storefront one to one
/// and a half turns before coming to rest.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct CamTuning {
    /// Radians of yaw per pixel of horizontal drag.
    pub drag_yaw_sensitivity: f32,
    /// Radians of pitch per pixel of vertical drag.
    pub drag_pitch_sensitivity: f32,
    /// Exponential decay rate of the spin velocity, per second.
    pub damping: f32,
    /// Spin velocity (rad/s) below which the camera snaps to rest.
    pub min_velocity: f32,
    /// Allowed pitch range in radians. The lower bound keeps the camera above the object.
    pub pitch_bounds: (f32, f32),
    /// Allowed pinch distance range.
    pub pinch_range: (f32, f32),
    /// Pinch distance change per pixel of finger spread.
    pub pinch_sensitivity: f32,
    /// Pinch distance at which a focused frame is shown at its authored distance.
    pub neutral_distance: f32,
    /// Length of an anchor transition, in milliseconds.
    pub transition_duration_ms: u64,
    /// Smallest time step used when turning a drag into a velocity, in seconds.
    pub min_drag_dt: f32,
    /// Pointer moves smaller than this on both axes, in pixels, are ignored.
    pub jitter_threshold: f32,
    /// Distance from the default pose at which pre-arrival easing stops.
    pub settle_tolerance: f32,
    /// Fraction of the remaining distance covered per frame while easing before arrival.
    pub settle_rate: f32,
    /// Distance ahead of the camera used to rebuild a look-at point from its facing direction.
    pub look_ahead: f32,
    /// Frame time assumed when the host does not supply one, in seconds.
    pub fallback_delta: f32,
}

impl Default for CamTuning {
    fn default() -> Self {
        Self {
            drag_yaw_sensitivity: 0.025,
            drag_pitch_sensitivity: 0.01,
            damping: 3.5,
            min_velocity: 0.001,
            pitch_bounds: (0.1, FRAC_PI_2),
            pinch_range: (3.0, 7.0),
            pinch_sensitivity: 0.01,
            neutral_distance: 5.0,
            transition_duration_ms: 1000,
            min_drag_dt: 1.0 / 120.0,
            jitter_threshold: 0.5,
            settle_tolerance: 0.01,
            settle_rate: 0.1,
            look_ahead: 10.0,
            fallback_delta: 1.0 / 60.0,
        }
    }
}

impl CamTuning {
    /// Parse tuning overrides from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// The anchor transition duration.
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    /// Clamp a pitch angle to [`CamTuning::pitch_bounds`].
    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(self.pitch_bounds.0, self.pitch_bounds.1)
    }

    /// Check that every range is ordered and every rate is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::InvalidTuning(msg.to_owned()));
        let (min_pitch, max_pitch) = self.pitch_bounds;
        let (min_pinch, max_pinch) = self.pinch_range;
        if !(min_pitch.is_finite() && max_pitch.is_finite() && min_pitch <= max_pitch) {
            return invalid("pitch bounds must be finite and ordered");
        }
        if !(min_pinch.is_finite() && max_pinch.is_finite() && 0.0 < min_pinch) {
            return invalid("pinch range must be finite and positive");
        }
        if min_pinch > max_pinch {
            return invalid("pinch range must be ordered");
        }
        if !(min_pinch..=max_pinch).contains(&self.neutral_distance) {
            return invalid("neutral distance must lie inside the pinch range");
        }
        if self.transition_duration_ms == 0 {
            return invalid("transition duration must be non-zero");
        }
        if self.damping <= 0.0 || self.min_velocity <= 0.0 {
            return invalid("damping and minimum velocity must be positive");
        }
        if !(self.settle_rate > 0.0 && self.settle_rate <= 1.0) {
            return invalid("settle rate must be in (0, 1]");
        }
        if self.min_drag_dt <= 0.0 || self.fallback_delta <= 0.0 {
            return invalid("time steps must be positive");
        }
        Ok(())
    }
}
