//! Configuration errors, raised while building an [`AnchorTable`](crate::anchors::AnchorTable)
//! or validating [`CamTuning`](crate::controller::tuning::CamTuning).
//!
//! Nothing in the per-frame path returns an error. Bad runtime requests (unknown anchor ids, calls
//! made before arrival, malformed pointer payloads) are logged and ignored instead.

use thiserror::Error;

/// A camera configuration that cannot produce valid camera poses.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The anchor table has no entries, so there is no default frame to fall back on.
    #[error("anchor table is empty")]
    EmptyAnchorTable,
    /// Two anchors share the same id.
    #[error("anchor id `{0}` is defined more than once")]
    DuplicateAnchor(String),
    /// An anchor position, target or reserved bound contains a NaN or infinite component.
    #[error("anchor `{0}` has a non-finite position, target or bound")]
    NonFiniteAnchor(String),
    /// The anchor position and target coincide or are too far apart to measure, so yaw and pitch
    /// are undefined.
    #[error("anchor `{0}` has no usable distance between its position and target")]
    DegenerateAnchor(String),
    /// A tuning value is out of range.
    #[error("invalid camera tuning: {0}")]
    InvalidTuning(String),
    /// Anchor or tuning JSON could not be parsed.
    #[error("failed to parse camera configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
