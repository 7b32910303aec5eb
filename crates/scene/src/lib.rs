//! Scene graph: node arena, shared shape/paint catalog, lights and fog.
//!
//! # Invariants
//! - Parent/child links form a strict tree; a node is attached at most once.
//! - Shape and paint handles stay valid for the lifetime of the catalog.
//! - All mutations go through explicit operations on [`Scene`].

pub mod camera;
pub mod catalog;
pub mod graph;
pub mod light;
pub mod node;

pub use camera::CameraView;
pub use catalog::{Catalog, PaintHandle, PaintTemplate, ShapeHandle, ShapeTemplate};
pub use graph::{Drawable, Fog, Scene};
pub use light::{Light, LightKind, ShadowConfig};
pub use node::{Mesh, Node};

pub fn crate_info() -> &'static str {
    "village-scene v0.1.0"
}
