//! Optional extensions to the base camera controller.

#[cfg(feature = "extension_go_to_anchor")]
pub mod go_to_anchor;
