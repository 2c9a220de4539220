//! The primary [`Component`] of the controller, [`StorefrontCam`].

use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_time::{prelude::*, Real};
use bevy_transform::prelude::*;

use super::{
    inputs::DragSession,
    orbit::{CameraPose, OrbitState},
    transition::Transition,
    tuning::CamTuning,
    zoom::PinchZoom,
};
use crate::{
    anchors::{Anchor, AnchorTable},
    error::ConfigError,
};

/// Where the visitor is in the experience. Owned and changed by the host application only.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Resource)]
pub enum ScenePhase {
    /// The camera is locked to the default frame and ignores orbit input.
    #[default]
    PreArrival,
    /// The camera is interactive.
    Arrived,
}

/// Whether the camera may orbit freely or is locked onto a point of interest.
///
/// Derived from the active anchor, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus<'a> {
    /// The default frame is active and the camera spins around the storefront.
    Default,
    /// The camera is locked onto the anchor with this id.
    Anchor(&'a str),
}

impl Focus<'_> {
    /// `"default"`, or the focused anchor id.
    pub fn as_str(&self) -> &str {
        match self {
            Focus::Default => "default",
            Focus::Anchor(id) => id,
        }
    }
}

/// Everything the frame driver needs from the host for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Current phase, pushed every frame.
    pub phase: ScenePhase,
    /// Monotonic clock value, used to time transitions.
    pub now: Duration,
    /// Seconds since the last frame. `None`, zero, or non-finite falls back to
    /// [`CamTuning::fallback_delta`].
    pub delta_seconds: Option<f32>,
}

/// Tracks all state of a storefront camera: its anchors, phase, orbit, transition and input.
///
/// # Moving the Camera
///
/// The [`StorefrontCamPlugin`](super::StorefrontCamPlugin) advances every camera once per frame
/// and copies the resulting [`CameraPose`] into its [`Transform`]. The controller is the only
/// writer of that transform.
///
/// To drive the controller manually, without an ECS:
///
/// 1. Route device input with the `on_*` methods, or [`StorefrontCam::handle_input`].
/// 2. Request moves between anchors with [`StorefrontCam::go_to_anchor`].
/// 3. Call [`StorefrontCam::advance`] once per rendered frame and display the returned pose.
#[derive(Debug, Clone, Component)]
#[require(Transform)]
pub struct StorefrontCam {
    anchors: AnchorTable,
    pub(crate) tuning: CamTuning,
    phase: ScenePhase,
    /// Id of the anchor the camera is at or moving toward. The single source of truth for focus.
    active_anchor: String,
    pose: CameraPose,
    /// Clock value of the most recent frame.
    clock: Duration,
    pub(crate) orbit: OrbitState,
    transition: Option<Transition>,
    pub(crate) drag: Option<DragSession>,
    pub(crate) pinch: PinchZoom,
}

impl Default for StorefrontCam {
    fn default() -> Self {
        Self::from_parts(AnchorTable::storefront(), CamTuning::default())
    }
}

impl StorefrontCam {
    /// Create a controller resting at the default anchor, in the pre-arrival phase.
    pub fn new(anchors: AnchorTable, tuning: CamTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self::from_parts(anchors, tuning))
    }

    fn from_parts(anchors: AnchorTable, tuning: CamTuning) -> Self {
        let default_anchor = anchors.default_anchor();
        Self {
            active_anchor: default_anchor.id.clone(),
            pose: CameraPose::from_anchor(default_anchor),
            orbit: OrbitState::at_anchor(default_anchor),
            pinch: PinchZoom::new(&tuning),
            phase: ScenePhase::PreArrival,
            clock: Duration::ZERO,
            transition: None,
            drag: None,
            anchors,
            tuning,
        }
    }

    /// The anchor table this controller moves between.
    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    /// The controller's tuning.
    pub fn tuning(&self) -> &CamTuning {
        &self.tuning
    }

    /// The phase last pushed by the host.
    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// The pose written by the most recent frame.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Current orbit angles and spin velocity.
    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    /// Current pinch zoom distance.
    pub fn pinch_distance(&self) -> f32 {
        self.pinch.distance
    }

    /// The in-flight transition, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Is a transition in control of the camera?
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Is the user currently dragging to orbit?
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The anchor the camera is at, or moving toward.
    ///
    /// Read-only projection of the controller state, suitable for UI display.
    pub fn current_anchor(&self) -> &Anchor {
        self.anchors
            .get(&self.active_anchor)
            .unwrap_or_else(|| self.anchors.default_anchor())
    }

    /// Current focus, derived from the active anchor.
    pub fn focus(&self) -> Focus<'_> {
        if self.is_default_focus() {
            Focus::Default
        } else {
            Focus::Anchor(&self.active_anchor)
        }
    }

    fn is_default_focus(&self) -> bool {
        self.active_anchor == self.anchors.default_anchor().id
    }

    /// Can the camera be spun by dragging right now?
    pub fn is_spin_enabled(&self) -> bool {
        self.phase == ScenePhase::Arrived && self.is_default_focus()
    }

    /// Push the host's phase into the controller.
    ///
    /// Entering [`ScenePhase::PreArrival`] resets the controller to the default anchor. A transition
    /// in flight is redirected home from the displayed pose, otherwise the pose is eased back by
    /// [`StorefrontCam::advance`].
    pub fn set_phase(&mut self, phase: ScenePhase) {
        if phase == self.phase {
            return;
        }
        info!("Storefront camera phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        if phase == ScenePhase::PreArrival {
            self.reset_to_default();
        }
    }

    fn reset_to_default(&mut self) {
        let default_anchor = self.anchors.default_anchor();
        self.active_anchor = default_anchor.id.clone();
        self.orbit = OrbitState::at_anchor(default_anchor);
        self.pinch = PinchZoom::new(&self.tuning);
        self.drag = None;
        if self.transition.is_some() {
            let home = CameraPose::from_anchor(default_anchor);
            debug!("Redirecting camera transition home from {:?}", self.pose);
            self.transition = Some(Transition {
                anchor_id: default_anchor.id.clone(),
                start: self.pose,
                target: home,
                start_time: self.clock,
                duration: self.tuning.transition_duration(),
            });
        }
    }

    /// Start a smooth move to the anchor with the given id.
    ///
    /// Ignored before arrival, for unknown ids, and while already moving to the same anchor.
    /// Requesting a different anchor mid-flight restarts from the pose currently on screen, so the
    /// camera never snaps.
    pub fn go_to_anchor(&mut self, id: &str, now: Duration) {
        if self.phase != ScenePhase::Arrived {
            debug!("Ignoring move to `{id}` before arrival");
            return;
        }
        let Some(anchor) = self.anchors.get(id) else {
            warn!("Ignoring move to unknown anchor `{id}`");
            return;
        };
        if self
            .transition
            .as_ref()
            .is_some_and(|transition| transition.anchor_id == id)
        {
            return;
        }

        let start = CameraPose {
            position: self.pose.position,
            look_at: self.pose.position + self.pose.forward() * self.tuning.look_ahead,
        };
        let target = CameraPose::from_anchor(anchor);
        debug!(
            "Camera transition `{}` -> `{id}`: {:?} -> {:?}",
            self.active_anchor, start, target
        );
        self.transition = Some(Transition {
            anchor_id: anchor.id.clone(),
            start,
            target,
            start_time: now,
            duration: self.tuning.transition_duration(),
        });
        self.orbit.yaw_velocity = 0.0;
        self.active_anchor = anchor.id.clone();

        let is_default = self.is_default_focus();
        if !is_default {
            self.drag = None;
        }
        // Aim the orbit at the destination so spinning resumes from where the camera lands.
        self.orbit.aim_at(anchor);
        self.pinch.distance = self.tuning.neutral_distance;
        if is_default {
            self.orbit.lock_to(anchor);
        }
    }

    /// Compute this frame's pose and remember it as the displayed pose.
    ///
    /// An active transition has exclusive control. Otherwise the camera eases toward the default
    /// frame before arrival, and orbits after it.
    pub fn advance(&mut self, input: FrameInput) -> CameraPose {
        self.clock = input.now;
        self.set_phase(input.phase);
        let delta_seconds = input
            .delta_seconds
            .filter(|dt| dt.is_finite() && *dt > 0.0)
            .unwrap_or(self.tuning.fallback_delta);

        if let Some(transition) = &self.transition {
            let sample = transition.sample(input.now);
            self.pose = sample.pose;
            if sample.complete {
                self.transition = None;
            }
            return self.pose;
        }

        if self.phase != ScenePhase::Arrived {
            self.settle();
            return self.pose;
        }

        self.pose = if self.is_default_focus() {
            if self.drag.is_none() {
                self.orbit.apply_inertia(&self.tuning, delta_seconds);
            }
            self.orbit.free_pose()
        } else {
            let anchor = self
                .anchors
                .get(&self.active_anchor)
                .unwrap_or_else(|| self.anchors.default_anchor());
            self.orbit
                .focused_pose(anchor, self.pinch.offset(&self.tuning))
        };
        self.pose
    }

    /// Ease toward the default pose, writing nothing once within tolerance.
    fn settle(&mut self) {
        let home = CameraPose::from_anchor(self.anchors.default_anchor());
        if self.pose.position.distance(home.position) > self.tuning.settle_tolerance {
            self.pose.position = self
                .pose
                .position
                .lerp(home.position, self.tuning.settle_rate);
            self.pose.look_at = home.look_at;
        }
    }

    /// Push the host phase into every camera.
    pub fn sync_phase(phase: Res<ScenePhase>, mut cameras: Query<&mut StorefrontCam>) {
        for mut controller in &mut cameras {
            controller.set_phase(*phase);
        }
    }

    /// Advance every camera by one frame and write its transform. Called once per frame.
    pub fn update_camera_positions(
        mut cameras: Query<(&mut StorefrontCam, &mut Transform)>,
        phase: Res<ScenePhase>,
        time: Res<Time<Real>>,
    ) {
        let input = FrameInput {
            phase: *phase,
            now: time.elapsed(),
            delta_seconds: Some(time.delta_secs()),
        };
        for (mut controller, mut transform) in &mut cameras {
            let pose = controller.advance(input);
            let next = Transform {
                scale: transform.scale,
                ..Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y)
            };
            transform.set_if_neq(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn arrived() -> StorefrontCam {
        let mut cam = StorefrontCam::default();
        cam.set_phase(ScenePhase::Arrived);
        cam
    }

    fn run(cam: &mut StorefrontCam, from: Duration, to: Duration) -> Duration {
        let mut now = from;
        while now < to {
            now += FRAME;
            cam.advance(FrameInput {
                phase: cam.phase(),
                now,
                delta_seconds: Some(FRAME.as_secs_f32()),
            });
        }
        now
    }

    fn anchor_pose(cam: &StorefrontCam, id: &str) -> CameraPose {
        CameraPose::from_anchor(cam.anchors().get(id).unwrap())
    }

    #[test]
    fn starts_at_default_before_arrival() {
        let cam = StorefrontCam::default();
        assert_eq!(cam.phase(), ScenePhase::PreArrival);
        assert_eq!(cam.focus(), Focus::Default);
        assert_eq!(cam.pose(), anchor_pose(&cam, "CAM_DEFAULT"));
        assert!(!cam.is_spin_enabled());
    }

    #[test]
    fn scenario_a_transition_lands_exactly() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        assert!(cam.is_transitioning());
        assert_eq!(cam.focus(), Focus::Anchor("CAM_ABOUT"));
        assert_eq!(cam.focus().as_str(), "CAM_ABOUT");

        run(&mut cam, Duration::ZERO, Duration::from_millis(1000));
        assert!(!cam.is_transitioning());
        assert_eq!(cam.pose(), anchor_pose(&cam, "CAM_ABOUT"));
    }

    #[test]
    fn scenario_b_retarget_starts_from_displayed_pose() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(500));
        let mid_flight = cam.pose();
        assert_ne!(mid_flight.position, anchor_pose(&cam, "CAM_DEFAULT").position);

        cam.go_to_anchor("CAM_PROJECTS", now);
        let transition = cam.transition().unwrap();
        assert_eq!(transition.anchor_id, "CAM_PROJECTS");
        assert_eq!(transition.start.position, mid_flight.position);
        let start_dir = (transition.start.look_at - transition.start.position).normalize();
        assert!(start_dir.distance(mid_flight.forward()) < 1e-5);
        assert_eq!(transition.target, anchor_pose(&cam, "CAM_PROJECTS"));
        assert_eq!(transition.start_time, now);

        run(&mut cam, now, now + Duration::from_millis(1000));
        assert_eq!(cam.pose(), anchor_pose(&cam, "CAM_PROJECTS"));
    }

    #[test]
    fn scenario_c_unknown_anchor_changes_nothing() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        run(&mut cam, Duration::ZERO, Duration::from_millis(300));
        let before = cam.clone();
        cam.go_to_anchor("CAM_NOPE", Duration::from_millis(300));
        assert_eq!(cam.pose(), before.pose());
        assert_eq!(cam.transition(), before.transition());
        assert_eq!(cam.orbit(), before.orbit());
        assert_eq!(cam.current_anchor(), before.current_anchor());
    }

    #[test]
    fn requests_before_arrival_are_ignored() {
        let mut cam = StorefrontCam::default();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        assert!(!cam.is_transitioning());
        assert_eq!(cam.current_anchor().id, "CAM_DEFAULT");
    }

    #[test]
    fn same_anchor_request_does_not_restart() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(400));
        cam.go_to_anchor("CAM_ABOUT", now);
        assert_eq!(cam.transition().unwrap().start_time, Duration::ZERO);
    }

    #[test]
    fn transition_end_is_independent_of_start() {
        for start_yaw in [0.0, 1.0, -2.5, 10.0] {
            let mut cam = arrived();
            cam.orbit.yaw = start_yaw;
            run(&mut cam, Duration::ZERO, Duration::from_millis(50));
            cam.go_to_anchor("CAM_NOTES", Duration::from_millis(50));
            cam.advance(FrameInput {
                phase: ScenePhase::Arrived,
                now: Duration::from_secs(7),
                delta_seconds: None,
            });
            assert_eq!(cam.pose(), anchor_pose(&cam, "CAM_NOTES"));
        }
    }

    #[test]
    fn focused_frame_holds_after_transition() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_EXPERIMENTS", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(1100));
        run(&mut cam, now, now + Duration::from_millis(500));
        let expected = anchor_pose(&cam, "CAM_EXPERIMENTS");
        assert!(cam.pose().distance(&expected) < 1e-5);
    }

    #[test]
    fn returning_home_restores_free_orbit() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_CONTACT", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(1000));
        cam.go_to_anchor("CAM_DEFAULT", now);
        assert_eq!(cam.focus(), Focus::Default);
        run(&mut cam, now, now + Duration::from_millis(1000));
        assert_eq!(cam.pose(), anchor_pose(&cam, "CAM_DEFAULT"));
        assert!((cam.orbit().fixed_radius - 1.6f32.hypot(5.0)).abs() < 1e-5);
        assert!(cam.is_spin_enabled());
    }

    #[test]
    fn inertia_spins_default_frame() {
        let mut cam = arrived();
        cam.orbit.yaw_velocity = 2.0;
        let yaw = cam.orbit().yaw;
        let height = cam.pose().position.y;
        run(&mut cam, Duration::ZERO, Duration::from_millis(200));
        assert!(cam.orbit().yaw > yaw);
        assert!(cam.orbit().yaw_velocity < 2.0);
        assert!((cam.pose().position.y - height).abs() < 1e-5);

        run(&mut cam, Duration::from_millis(200), Duration::from_secs(10));
        assert_eq!(cam.orbit().yaw_velocity, 0.0);
    }

    #[test]
    fn missing_delta_falls_back_to_sixty_hz() {
        let mut cam = arrived();
        cam.orbit.yaw_velocity = 1.0;
        let yaw = cam.orbit().yaw;
        cam.advance(FrameInput {
            phase: ScenePhase::Arrived,
            now: Duration::ZERO,
            delta_seconds: None,
        });
        assert!((cam.orbit().yaw - yaw - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn transition_cancels_spin() {
        let mut cam = arrived();
        cam.orbit.yaw_velocity = 3.0;
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        assert_eq!(cam.orbit().yaw_velocity, 0.0);
    }

    #[test]
    fn pre_arrival_settle_is_idempotent() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_CONTACT", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(1000));

        cam.set_phase(ScenePhase::PreArrival);
        assert_eq!(cam.current_anchor().id, "CAM_DEFAULT");
        let now = run(&mut cam, now, now + Duration::from_secs(5));
        let home = anchor_pose(&cam, "CAM_DEFAULT");
        let settled = cam.pose();
        assert!(settled.position.distance(home.position) <= 0.01);
        assert_eq!(settled.look_at, home.look_at);

        run(&mut cam, now, now + Duration::from_secs(1));
        assert_eq!(cam.pose(), settled);
    }

    #[test]
    fn leaving_mid_flight_lands_home_without_jumping() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);

        let home = anchor_pose(&cam, "CAM_DEFAULT");
        let mut last = cam.pose();
        let mut now = Duration::ZERO;
        let mut asked_again = false;
        while now < Duration::from_millis(2500) {
            now += FRAME;
            let phase = if (300..400).contains(&now.as_millis()) {
                ScenePhase::PreArrival
            } else {
                ScenePhase::Arrived
            };
            let pose = cam.advance(FrameInput {
                phase,
                now,
                delta_seconds: Some(FRAME.as_secs_f32()),
            });
            assert!(
                pose.position.distance(last.position) < 0.1,
                "jumped from {:?} to {:?} at {:?}",
                last.position,
                pose.position,
                now
            );
            last = pose;

            if phase == ScenePhase::PreArrival {
                assert_eq!(cam.current_anchor().id, "CAM_DEFAULT");
                assert_eq!(cam.transition().unwrap().anchor_id, "CAM_DEFAULT");
                assert_eq!(cam.transition().unwrap().target, home);
            }
            if let Some(transition) = cam.transition() {
                assert_eq!(transition.anchor_id, cam.current_anchor().id);
            }
            if !asked_again && now >= Duration::from_millis(1500) {
                assert!(!cam.is_transitioning());
                assert!(cam.pose().distance(&home) < 1e-4);
                asked_again = true;
            }
        }
        assert!(asked_again);
    }

    #[test]
    fn anchor_can_be_requested_again_after_redirect_home() {
        let mut cam = arrived();
        cam.go_to_anchor("CAM_ABOUT", Duration::ZERO);
        let now = run(&mut cam, Duration::ZERO, Duration::from_millis(300));
        cam.set_phase(ScenePhase::PreArrival);
        cam.set_phase(ScenePhase::Arrived);

        cam.go_to_anchor("CAM_ABOUT", now);
        let transition = cam.transition().unwrap();
        assert_eq!(transition.anchor_id, "CAM_ABOUT");
        assert_eq!(transition.start_time, now);
        assert_eq!(cam.focus(), Focus::Anchor("CAM_ABOUT"));
    }

    #[test]
    fn rejects_invalid_tuning() {
        let tuning = CamTuning {
            damping: 0.0,
            ..Default::default()
        };
        assert!(StorefrontCam::new(AnchorTable::storefront(), tuning).is_err());
    }
}
