//! Fixed placement table for the village.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Where one prop instance goes: ground position, yaw and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub x: f32,
    pub z: f32,
    pub rotation: f32,
    pub scale: f32,
}

impl LayoutEntry {
    pub const fn new(x: f32, z: f32, rotation: f32, scale: f32) -> Self {
        Self {
            x,
            z,
            rotation,
            scale,
        }
    }
}

pub const COTTAGES: [LayoutEntry; 3] = [
    LayoutEntry::new(-3.0, -1.5, PI * 0.08, 1.0),
    LayoutEntry::new(0.0, -2.5, -PI * 0.06, 0.95),
    LayoutEntry::new(3.0, -1.2, PI * 0.12, 1.05),
];

pub const STALLS: [LayoutEntry; 2] = [
    LayoutEntry::new(-2.6, 2.2, PI * 0.15, 1.0),
    LayoutEntry::new(0.8, 2.6, -PI * 0.2, 1.0),
];

pub const TREES: [LayoutEntry; 3] = [
    LayoutEntry::new(-6.0, -2.0, 0.0, 1.2),
    LayoutEntry::new(5.0, -3.0, 0.0, 1.1),
    LayoutEntry::new(4.0, 3.0, 0.0, 0.9),
];

pub const WELL_POSITION: Vec3 = Vec3::new(0.0, 0.0, 2.2);
pub const LAMP_POSITION: Vec3 = Vec3::new(-4.0, 0.0, -1.0);
pub const BARRELS: [Vec3; 2] = [Vec3::new(2.6, 0.2, -0.6), Vec3::new(1.8, 0.2, 0.6)];

/// Cobble grid: `CELLS` steps of `STEP` starting at `ORIGIN` on both axes.
pub mod cobble_grid {
    pub const ORIGIN: f32 = -10.0;
    pub const STEP: f32 = 0.6;
    pub const CELLS: usize = 34;
    pub const JITTER: f32 = 0.1;
    pub const BASE_HEIGHT: f32 = 0.01;
    pub const HEIGHT_RANGE: f32 = 0.02;
}
