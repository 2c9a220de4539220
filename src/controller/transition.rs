//! Timed, eased camera moves between two poses.

use std::time::Duration;

use super::orbit::CameraPose;

/// Symmetric quadratic ease-in-out. Maps `[0, 1]` onto `[0, 1]`, input is clamped.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// An in-flight move from a captured start pose to an anchor's pose.
///
/// Progress is recomputed from the clock every frame, so uneven frame spacing changes smoothness
/// but never the end state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Anchor being moved to.
    pub anchor_id: String,
    /// Pose at the instant the transition was requested.
    pub start: CameraPose,
    /// Destination anchor pose.
    pub target: CameraPose,
    /// Clock value when the transition started.
    pub start_time: Duration,
    /// Total length of the move.
    pub duration: Duration,
}

/// Result of sampling a [`Transition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSample {
    /// Interpolated pose, exactly the target once complete.
    pub pose: CameraPose,
    /// Has the transition reached its destination?
    pub complete: bool,
}

impl Transition {
    /// Linear progress in `[0, 1]` at clock value `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.start_time);
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// The pose to display at clock value `now`.
    pub fn sample(&self, now: Duration) -> TransitionSample {
        let progress = self.progress(now);
        if progress >= 1.0 {
            // Snap to avoid floating point residue from the lerp.
            return TransitionSample {
                pose: self.target,
                complete: true,
            };
        }
        TransitionSample {
            pose: self.start.lerp(&self.target, ease_in_out(progress)),
            complete: false,
        }
    }
}
