//! The storefront camera controller: orbit, inertia, pinch zoom and anchor transitions.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_time::{Real, Time};
use bevy_transform::prelude::*;

pub mod component;
pub mod inputs;
pub mod orbit;
pub mod transition;
pub mod tuning;
pub mod zoom;

pub use component::{FrameInput, ScenePhase, StorefrontCam};

/// Ordering of the controller's systems. Phase sync runs in [`PreUpdate`] and [`PostUpdate`], driving
/// only in [`PostUpdate`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorefrontCamSystems {
    /// Copies [`ScenePhase`] into every camera. Input routing and anchor requests run after this.
    SyncPhase,
    /// Advances every camera and writes its transform.
    Drive,
}

/// Adds the [`ScenePhase`] resource and the systems that drive every [`StorefrontCam`].
pub struct StorefrontCamPlugin;

impl Plugin for StorefrontCamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScenePhase>()
            .init_resource::<Time<Real>>()
            .configure_sets(
                PostUpdate,
                (StorefrontCamSystems::SyncPhase, StorefrontCamSystems::Drive)
                    .chain()
                    .before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PreUpdate,
                StorefrontCam::sync_phase.in_set(StorefrontCamSystems::SyncPhase),
            )
            .add_systems(
                PostUpdate,
                (
                    StorefrontCam::sync_phase.in_set(StorefrontCamSystems::SyncPhase),
                    StorefrontCam::update_camera_positions.in_set(StorefrontCamSystems::Drive),
                ),
            )
            .register_type::<ScenePhase>()
            .register_type::<tuning::CamTuning>();
    }
}
