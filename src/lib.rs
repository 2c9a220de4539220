//! A storefront-style camera controller for Bevy.
//!
//! The camera waits at a default frame until the host application signals arrival, then lets the
//! visitor spin around the storefront with inertia, and glides between named anchors (points of
//! interest) on request. While focused on an anchor, spinning is locked and only a narrow pinch
//! zoom is available.
//!
//! ## Usage
//!
//! 1. Add [`DefaultStorefrontCamPlugins`] to your app.
//! 2. Add the [`StorefrontCam`](crate::prelude::StorefrontCam) component to a camera.
//! 3. Set the [`ScenePhase`](crate::prelude::ScenePhase) resource to `Arrived` when the visitor
//!    may take control.
//! 4. Send [`GoToAnchor`](crate::prelude::GoToAnchor) events to move between anchors.
//!
//! The controller core has no ECS dependency: [`StorefrontCam::advance`](prelude::StorefrontCam::advance)
//! turns the current state and clock into a [`CameraPose`](prelude::CameraPose), so it can be
//! driven from any frame loop.

#![warn(missing_docs)]

pub mod anchors;
pub mod controller;
pub mod error;
pub mod extensions;
pub mod input;

use bevy_app::{prelude::*, PluginGroupBuilder};

/// Common imports.
pub mod prelude {
    pub use crate::{
        anchors::{Anchor, AnchorTable, DEFAULT_ANCHOR_ID},
        controller::{
            component::{Focus, FrameInput, ScenePhase, StorefrontCam},
            inputs::{CamInput, InputResponse, PointerButton, PointerDown, PointerKind, PointerMove},
            orbit::CameraPose,
            tuning::CamTuning,
            StorefrontCamPlugin, StorefrontCamSystems,
        },
        error::ConfigError,
        input::DefaultInputPlugin,
        DefaultStorefrontCamPlugins,
    };

    #[cfg(feature = "extension_go_to_anchor")]
    pub use crate::extensions::go_to_anchor::{GoToAnchor, GoToAnchorPlugin};
}

/// Adds [`StorefrontCamPlugin`](controller::StorefrontCamPlugin), the window input routing, and
/// every enabled extension.
pub struct DefaultStorefrontCamPlugins;

impl PluginGroup for DefaultStorefrontCamPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(input::DefaultInputPlugin)
            .add(controller::StorefrontCamPlugin);

        #[cfg(feature = "extension_go_to_anchor")]
        let group = group.add(extensions::go_to_anchor::GoToAnchorPlugin);

        group
    }
}
