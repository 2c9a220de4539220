//! Spherical orbit coordinates and spin inertia.

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::tuning::CamTuning;
use crate::anchors::Anchor;

/// A camera position and the point it looks at. The only thing the controller ever outputs.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera faces.
    pub look_at: Vec3,
}

impl CameraPose {
    /// The pose an anchor describes.
    pub fn from_anchor(anchor: &Anchor) -> Self {
        Self {
            position: anchor.position,
            look_at: anchor.target,
        }
    }

    /// Unit vector from the position toward the look-at point, or zero if they coincide.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    /// Linear interpolation of both position and look-at point.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            look_at: self.look_at.lerp(other.look_at, t),
        }
    }

    /// Greatest distance between the positions or look-at points of two poses.
    pub fn distance(&self, other: &Self) -> f32 {
        self.position
            .distance(other.position)
            .max(self.look_at.distance(other.look_at))
    }
}

/// Camera position on a sphere of `radius` around `center`.
///
/// Yaw 0 places the camera on +Z, positive pitch raises it above the center.
pub fn spherical_position(center: Vec3, radius: f32, yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    center + radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
}

/// Yaw, pitch, spin velocity, and the locked sphere used while orbiting the default frame.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct OrbitState {
    /// Horizontal angle in radians. Unbounded, wraps through the trigonometry.
    pub yaw: f32,
    /// Vertical angle in radians.
    pub pitch: f32,
    /// Spin velocity in radians per second.
    pub yaw_velocity: f32,
    /// Orbit radius while in the default frame.
    pub fixed_radius: f32,
    /// Orbit center while in the default frame.
    pub fixed_target: Vec3,
}

impl OrbitState {
    /// Orbit state resting at the given (default) anchor.
    pub fn at_anchor(anchor: &Anchor) -> Self {
        let (yaw, pitch) = anchor.yaw_pitch();
        Self {
            yaw,
            pitch,
            yaw_velocity: 0.0,
            fixed_radius: anchor.distance(),
            fixed_target: anchor.target,
        }
    }

    /// Point yaw and pitch at an anchor's camera position, keeping the locked sphere.
    pub fn aim_at(&mut self, anchor: &Anchor) {
        (self.yaw, self.pitch) = anchor.yaw_pitch();
    }

    /// Take the locked radius and center from a default anchor.
    pub fn lock_to(&mut self, anchor: &Anchor) {
        self.fixed_radius = anchor.distance();
        self.fixed_target = anchor.target;
    }

    /// Is the camera still spinning?
    pub fn is_spinning(&self, tuning: &CamTuning) -> bool {
        self.yaw_velocity.abs() > tuning.min_velocity
    }

    /// Advance yaw by the spin velocity and decay it exponentially.
    ///
    /// Once the velocity drops below [`CamTuning::min_velocity`] it becomes exactly zero, so the
    /// camera always reaches rest in a finite number of frames. Pitch is never touched.
    pub fn apply_inertia(&mut self, tuning: &CamTuning, delta_seconds: f32) {
        if !self.is_spinning(tuning) {
            return;
        }
        self.yaw += self.yaw_velocity * delta_seconds;
        self.yaw_velocity *= (-tuning.damping * delta_seconds).exp();
        if self.yaw_velocity.abs() < tuning.min_velocity {
            self.yaw_velocity = 0.0;
        }
    }

    /// Pose on the locked default sphere.
    pub fn free_pose(&self) -> CameraPose {
        CameraPose {
            position: spherical_position(
                self.fixed_target,
                self.fixed_radius,
                self.yaw,
                self.pitch,
            ),
            look_at: self.fixed_target,
        }
    }

    /// Pose around a focused anchor, pushed in or out by the pinch offset.
    pub fn focused_pose(&self, anchor: &Anchor, pinch_offset: f32) -> CameraPose {
        let radius = anchor.distance() + pinch_offset;
        CameraPose {
            position: spherical_position(anchor.target, radius, self.yaw, self.pitch),
            look_at: anchor.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::anchors::AnchorTable;

    #[test]
    fn anchor_pose_round_trips_through_angles() {
        for anchor in AnchorTable::storefront().iter() {
            let mut orbit = OrbitState::at_anchor(anchor);
            orbit.aim_at(anchor);
            let pose = orbit.focused_pose(anchor, 0.0);
            assert!(
                pose.position.distance(anchor.position) < 1e-5,
                "{} drifted to {:?}",
                anchor.id,
                pose.position
            );
        }
    }

    #[test]
    fn free_pose_keeps_radius_and_height() {
        let table = AnchorTable::storefront();
        let mut orbit = OrbitState::at_anchor(table.default_anchor());
        let start = orbit.free_pose();
        orbit.yaw += 2.0;
        let spun = orbit.free_pose();
        assert!((spun.position.y - start.position.y).abs() < 1e-5);
        assert!((spun.position.distance(spun.look_at) - orbit.fixed_radius).abs() < 1e-5);
        assert_eq!(spun.look_at, start.look_at);
    }

    #[test]
    fn inertia_snaps_to_rest() {
        let tuning = CamTuning::default();
        let mut orbit = OrbitState::at_anchor(AnchorTable::storefront().default_anchor());
        orbit.yaw_velocity = 0.0011;
        orbit.apply_inertia(&tuning, 0.1);
        assert_eq!(orbit.yaw_velocity, 0.0);
        let yaw = orbit.yaw;
        orbit.apply_inertia(&tuning, 0.1);
        assert_eq!(orbit.yaw, yaw);
    }

    proptest! {
        #[test]
        fn inertia_decays_within_bound(v0 in 0.01f32..50.0, negative in any::<bool>()) {
            let tuning = CamTuning::default();
            let dt = 1.0 / 60.0;
            let mut orbit = OrbitState::at_anchor(AnchorTable::storefront().default_anchor());
            orbit.yaw_velocity = if negative { -v0 } else { v0 };
            let pitch = orbit.pitch;

            let bound = ((v0 / tuning.min_velocity).ln() / (tuning.damping * dt)).ceil() as usize + 1;
            let mut last = orbit.yaw_velocity.abs();
            let mut ticks = 0;
            while orbit.yaw_velocity != 0.0 {
                orbit.apply_inertia(&tuning, dt);
                let speed = orbit.yaw_velocity.abs();
                prop_assert!(speed < last);
                last = speed;
                ticks += 1;
                prop_assert!(ticks <= bound, "still spinning after {} ticks", ticks);
            }
            prop_assert_eq!(orbit.pitch, pitch);
        }
    }
}
