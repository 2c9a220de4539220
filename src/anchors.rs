//! The fixed, ordered table of named camera frames the controller moves between.

use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Id of the frame the camera rests at before arrival, and the only frame that allows free
/// orbiting.
pub const DEFAULT_ANCHOR_ID: &str = "CAM_DEFAULT";

/// An immutable, named camera frame: where the camera sits and what it looks at.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Anchor {
    /// Unique identifier, e.g. `CAM_ABOUT`.
    pub id: String,
    /// Camera position in world space.
    pub position: Vec3,
    /// Look-at point in world space.
    pub target: Vec3,
    /// Reserved. Declared per frame but not enforced by the controller.
    pub yaw_bounds: (f32, f32),
    /// Reserved. Declared per frame but not enforced by the controller.
    pub height_bounds: (f32, f32),
}

impl Anchor {
    /// Create an anchor with empty reserved bounds.
    pub fn new(id: impl Into<String>, position: Vec3, target: Vec3) -> Self {
        Self {
            id: id.into(),
            position,
            target,
            yaw_bounds: (0.0, 0.0),
            height_bounds: (0.0, 0.0),
        }
    }

    /// Set the reserved yaw and height bounds.
    pub fn with_bounds(self, yaw_bounds: (f32, f32), height_bounds: (f32, f32)) -> Self {
        Self {
            yaw_bounds,
            height_bounds,
            ..self
        }
    }

    /// Is this the default frame?
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_ANCHOR_ID
    }

    /// Distance from the camera position to the look-at target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Spherical `(yaw, pitch)` of the camera position about the target.
    ///
    /// Only meaningful for validated anchors, where the distance is non-zero.
    pub fn yaw_pitch(&self) -> (f32, f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        (yaw, pitch)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [self.yaw_bounds, self.height_bounds];
        if !self.position.is_finite()
            || !self.target.is_finite()
            || bounds.iter().any(|(min, max)| !min.is_finite() || !max.is_finite())
        {
            return Err(ConfigError::NonFiniteAnchor(self.id.clone()));
        }
        let distance = self.distance();
        if distance <= f32::EPSILON || !distance.is_finite() {
            return Err(ConfigError::DegenerateAnchor(self.id.clone()));
        }
        Ok(())
    }
}

/// The on-disk shape of an anchor, matching `anchors.json`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnchorRecord {
    id: String,
    position: [f32; 3],
    target: [f32; 3],
    #[serde(default)]
    yaw_bounds: [f32; 2],
    #[serde(default)]
    height_bounds: [f32; 2],
}

impl From<AnchorRecord> for Anchor {
    fn from(record: AnchorRecord) -> Self {
        Anchor::new(
            record.id,
            Vec3::from_array(record.position),
            Vec3::from_array(record.target),
        )
        .with_bounds(
            (record.yaw_bounds[0], record.yaw_bounds[1]),
            (record.height_bounds[0], record.height_bounds[1]),
        )
    }
}

/// A validated, ordered list of [`Anchor`]s. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct AnchorTable {
    anchors: Vec<Anchor>,
    default_index: usize,
}

impl AnchorTable {
    /// Validate and wrap a list of anchors.
    ///
    /// Fails if the list is empty, contains duplicate ids, or contains an anchor whose geometry
    /// would produce undefined orbit angles. If no anchor is named [`DEFAULT_ANCHOR_ID`], the first
    /// entry is used as the default.
    pub fn new(anchors: Vec<Anchor>) -> Result<Self, ConfigError> {
        if anchors.is_empty() {
            return Err(ConfigError::EmptyAnchorTable);
        }
        for (i, anchor) in anchors.iter().enumerate() {
            anchor.validate()?;
            if anchors[..i].iter().any(|a| a.id == anchor.id) {
                return Err(ConfigError::DuplicateAnchor(anchor.id.clone()));
            }
        }
        let default_index = match anchors.iter().position(Anchor::is_default) {
            Some(index) => index,
            None => {
                warn!(
                    "No `{DEFAULT_ANCHOR_ID}` anchor defined, falling back to `{}`",
                    anchors[0].id
                );
                0
            }
        };
        Ok(Self {
            anchors,
            default_index,
        })
    }

    /// Parse a JSON array of anchors (`id`, `position`, `target`, `yawBounds`, `heightBounds`).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let records: Vec<AnchorRecord> = serde_json::from_str(json)?;
        Self::new(records.into_iter().map(Anchor::from).collect())
    }

    /// The six frames of the storefront scene: the sidewalk view and one frame per section.
    pub fn storefront() -> Self {
        let narrow = ((-0.3, 0.3), (1.4, 1.8));
        let anchors = vec![
            Anchor::new(DEFAULT_ANCHOR_ID, Vec3::new(0.0, 1.6, 5.0), Vec3::ZERO)
                .with_bounds((-0.5, 0.5), (1.2, 2.0)),
            Anchor::new(
                "CAM_ABOUT",
                Vec3::new(-1.5, 1.6, 3.0),
                Vec3::new(-1.0, 0.0, 0.0),
            )
            .with_bounds(narrow.0, narrow.1),
            Anchor::new(
                "CAM_PROJECTS",
                Vec3::new(1.5, 1.6, 3.0),
                Vec3::new(1.0, 0.0, 0.0),
            )
            .with_bounds(narrow.0, narrow.1),
            Anchor::new(
                "CAM_EXPERIMENTS",
                Vec3::new(0.0, 1.6, 2.5),
                Vec3::new(0.0, 0.5, 0.0),
            )
            .with_bounds((-0.2, 0.2), (1.5, 1.7)),
            Anchor::new(
                "CAM_NOTES",
                Vec3::new(-2.0, 1.6, 4.0),
                Vec3::new(-1.5, 0.0, 0.0),
            )
            .with_bounds(narrow.0, narrow.1),
            Anchor::new(
                "CAM_CONTACT",
                Vec3::new(2.0, 1.6, 4.0),
                Vec3::new(1.5, 0.0, 0.0),
            )
            .with_bounds(narrow.0, narrow.1),
        ];
        // The built-in frames are known to be valid.
        Self {
            anchors,
            default_index: 0,
        }
    }

    /// The frame used before arrival and for free orbiting.
    pub fn default_anchor(&self) -> &Anchor {
        &self.anchors[self.default_index]
    }

    /// Look up an anchor by id.
    pub fn get(&self, id: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    /// Iterate over anchors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Always false, tables are validated to be non-empty.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl Default for AnchorTable {
    fn default() -> Self {
        Self::storefront()
    }
}
