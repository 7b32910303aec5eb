//! Village runtime: parameter store, per-frame animation, frame ordering and
//! the app context that owns a running village.
//!
//! # Invariants
//! - Frame steps run in a fixed order: clock, animation, controls, render, schedule.
//! - The lantern baseline in [`Params`] is never overwritten by flicker.
//! - A missing animation target never aborts a frame.

pub mod animation;
pub mod app;
pub mod params;

pub use animation::{AnimationState, TickReport, lantern_intensity, window_pulse};
pub use app::{AppContext, Clock, FrameHost};
pub use params::{ConfigError, ParamChange, Params};

pub fn crate_info() -> &'static str {
    "village-runtime v0.1.0"
}
