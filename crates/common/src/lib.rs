//! Shared types for the village scene: node ids, transforms, colors, errors.

mod error;
mod types;

pub use error::SceneError;
pub use types::{Color, NodeId, Transform};

pub fn crate_info() -> &'static str {
    "village-common v0.1.0"
}
