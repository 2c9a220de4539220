//! Provides [`PinchZoom`], the narrow two-finger zoom used in focused frames.

use bevy_math::prelude::*;
use bevy_reflect::Reflect;

use super::tuning::CamTuning;

/// Two-finger pinch state.
///
/// The pinch distance only moves the camera while it is focused on a point of interest. It lives in
/// a narrow range: close enough to read the content, far enough to still feel like standing outside
/// on the sidewalk. Wheel and trackpad scrolling never zoom.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PinchZoom {
    /// Current zoom distance, always inside [`CamTuning::pinch_range`].
    pub distance: f32,
    /// Finger spread of the previous pinch sample, in pixels. Zero when no pinch is in progress.
    pub last_spread: f32,
}

impl PinchZoom {
    /// A pinch state at the neutral distance, with no pinch in progress.
    pub fn new(tuning: &CamTuning) -> Self {
        Self {
            distance: tuning.neutral_distance,
            last_spread: 0.0,
        }
    }

    /// Is a two-finger gesture in progress? New drags are refused while it is.
    pub fn is_pinching(&self) -> bool {
        self.last_spread > 0.0
    }

    /// Record the spread of a new two-finger gesture.
    pub fn begin(&mut self, spread: f32) {
        self.last_spread = spread;
    }

    /// Forget the pinch baseline, re-enabling single-finger drags.
    pub fn reset_baseline(&mut self) {
        self.last_spread = 0.0;
    }

    /// Apply a new finger spread. Spreading fingers apart moves the camera closer.
    pub fn update(&mut self, spread: f32, tuning: &CamTuning) {
        if self.is_pinching() {
            let delta = (spread - self.last_spread) * tuning.pinch_sensitivity;
            let (min, max) = tuning.pinch_range;
            self.distance = (self.distance - delta).clamp(min, max);
        }
        self.last_spread = spread;
    }

    /// How far the focused orbit radius is pushed out from the anchor's own distance.
    pub fn offset(&self, tuning: &CamTuning) -> f32 {
        self.distance - tuning.neutral_distance
    }
}

/// Distance between the first two touch points.
pub fn finger_spread(touches: &[Vec2]) -> Option<f32> {
    match touches {
        [a, b] if a.is_finite() && b.is_finite() => Some(a.distance(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreading_moves_closer_within_range() {
        let tuning = CamTuning::default();
        let mut zoom = PinchZoom::new(&tuning);
        zoom.begin(100.0);
        zoom.update(150.0, &tuning);
        assert!((zoom.distance - 4.5).abs() < 1e-6);
        assert!((zoom.offset(&tuning) + 0.5).abs() < 1e-6);

        zoom.update(10_000.0, &tuning);
        assert_eq!(zoom.distance, 3.0);
        zoom.update(0.5, &tuning);
        assert_eq!(zoom.distance, 7.0);
    }

    #[test]
    fn first_sample_only_sets_baseline() {
        let tuning = CamTuning::default();
        let mut zoom = PinchZoom::new(&tuning);
        zoom.update(200.0, &tuning);
        assert_eq!(zoom.distance, 5.0);
        assert!(zoom.is_pinching());
        zoom.reset_baseline();
        assert!(!zoom.is_pinching());
    }

    #[test]
    fn spread_needs_exactly_two_fingers() {
        assert_eq!(finger_spread(&[Vec2::ZERO]), None);
        assert_eq!(finger_spread(&[Vec2::ZERO, Vec2::new(3.0, 4.0)]), Some(5.0));
        assert_eq!(finger_spread(&[Vec2::ZERO, Vec2::X, Vec2::Y]), None);
        assert_eq!(finger_spread(&[Vec2::ZERO, Vec2::NAN]), None);
    }
}
