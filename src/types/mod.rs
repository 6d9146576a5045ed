// ABOUTME: Validated domain types for node provisioning.
// ABOUTME: Node names and image references checked before any runtime call.

mod image_ref;
mod node_name;

pub use image_ref::{ImageRef, ParseImageRefError};
pub use node_name::{NodeName, NodeNameError};
