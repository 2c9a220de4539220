//! A `bevy_storefront_cam` extension that moves cameras between anchors by sending an event.
//!
//! This lets UI code such as a menu or HUD request a move without holding a mutable reference to
//! the camera.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_time::{Real, Time};
use bevy_window::RequestRedraw;

use crate::controller::{StorefrontCam, StorefrontCamSystems};

/// See the [module](self) docs.
pub struct GoToAnchorPlugin;

impl Plugin for GoToAnchorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<GoToAnchor>()
            .add_event::<RequestRedraw>()
            .add_systems(
                PostUpdate,
                GoToAnchor::receive
                    .after(StorefrontCamSystems::SyncPhase)
                    .before(StorefrontCamSystems::Drive),
            );
    }
}

/// Send this event to start a smooth move to the anchor with the given id.
///
/// The move is ignored before arrival and for unknown anchors. See
/// [`StorefrontCam::go_to_anchor`].
#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct GoToAnchor {
    /// The camera to move, or every camera when `None`.
    pub camera: Option<Entity>,
    /// Id of the destination anchor.
    pub anchor: String,
}

impl GoToAnchor {
    /// Move every camera to the anchor `anchor`.
    pub fn all(anchor: impl Into<String>) -> Self {
        Self {
            camera: None,
            anchor: anchor.into(),
        }
    }

    /// Move a single camera to the anchor `anchor`.
    pub fn camera(camera: Entity, anchor: impl Into<String>) -> Self {
        Self {
            camera: Some(camera),
            anchor: anchor.into(),
        }
    }

    fn receive(
        mut events: EventReader<Self>,
        mut cameras: Query<(Entity, &mut StorefrontCam)>,
        time: Res<Time<Real>>,
        mut redraw: EventWriter<RequestRedraw>,
    ) {
        for event in events.read() {
            let mut matched = false;
            for (entity, mut controller) in &mut cameras {
                if event.camera.is_some_and(|camera| camera != entity) {
                    continue;
                }
                matched = true;
                controller.go_to_anchor(&event.anchor, time.elapsed());
            }
            if matched {
                redraw.write(RequestRedraw);
            } else {
                debug!("No camera for move to `{}`", event.anchor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::{ScenePhase, StorefrontCamPlugin};

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((StorefrontCamPlugin, GoToAnchorPlugin));
        app
    }

    fn step(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time<Real>>()
            .advance_by(Duration::from_millis(16));
        app.update();
    }

    #[test]
    fn event_starts_transition_for_targeted_camera() {
        let mut app = app();
        *app.world_mut().resource_mut::<ScenePhase>() = ScenePhase::Arrived;
        let moved = app.world_mut().spawn(StorefrontCam::default()).id();
        let still = app.world_mut().spawn(StorefrontCam::default()).id();
        step(&mut app);

        app.world_mut().send_event(GoToAnchor::camera(moved, "CAM_PROJECTS"));
        step(&mut app);

        let moved = app.world().get::<StorefrontCam>(moved).unwrap();
        assert!(moved.is_transitioning());
        assert_eq!(moved.current_anchor().id, "CAM_PROJECTS");
        let still = app.world().get::<StorefrontCam>(still).unwrap();
        assert!(!still.is_transitioning());
    }

    #[test]
    fn event_before_arrival_is_ignored() {
        let mut app = app();
        let camera = app.world_mut().spawn(StorefrontCam::default()).id();
        app.world_mut().send_event(GoToAnchor::all("CAM_PROJECTS"));
        step(&mut app);

        let cam = app.world().get::<StorefrontCam>(camera).unwrap();
        assert!(!cam.is_transitioning());
        assert!(cam.current_anchor().is_default());
    }
}
