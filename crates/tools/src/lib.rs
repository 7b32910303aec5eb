//! Developer tooling: scene inspector shared by the desktop panel and the CLI.
//!
//! # Invariants
//! - Inspection is read-only.

pub mod inspector;

pub use inspector::{GroupCount, NodeInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "village-tools v0.1.0"
}
