//! wgpu render backend for the village scene.
//!
//! Builds one GPU mesh per catalog shape and draws every node sharing a
//! shape in a single instanced call. Camera is an orbit camera with damping.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Camera motion is host state, not scene state.

mod camera;
mod gpu;
pub mod mesh;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
