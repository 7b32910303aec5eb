use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::SceneError;

/// Identifier of a node in the scene graph arena.
///
/// Ids are handed out monotonically by the owning scene and never reused,
/// which keeps `BTreeMap` iteration in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::default()
        }
    }

    /// Replace the rotation with Euler angles applied in X, Y, Z order.
    pub fn with_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self
    }

    pub fn with_yaw(self, yaw: f32) -> Self {
        self.with_euler(0.0, yaw, 0.0)
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Compose a child's local transform under `self` as parent.
    ///
    /// Scale is applied component-wise, which is exact for the uniform
    /// scales used by every prop.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }
}

/// sRGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string.
    pub fn hex(s: &str) -> Result<Self, SceneError> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let invalid = || SceneError::InvalidColor(s.to_string());
        if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(Self::from_u32(value))
    }

    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as f32 / 255.0,
            g: ((value >> 8) & 0xff) as f32 / 255.0,
            b: (value & 0xff) as f32 / 255.0,
        }
    }

    /// Convert to linear light for shading.
    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    pub fn to_hex(self) -> String {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn euler_xyz_keeps_roll_when_pitch_changes() {
        let t = Transform::default().with_euler(0.3, 0.0, PI * 0.5);
        let (x, _, z) = t.rotation.to_euler(EulerRot::XYZ);
        assert!((x - 0.3).abs() < 1e-5);
        assert!((z - PI * 0.5).abs() < 1e-5);
    }

    #[test]
    fn then_applies_parent_rotation_and_scale() {
        let parent = Transform::from_xyz(1.0, 0.0, 0.0)
            .with_yaw(PI * 0.5)
            .with_uniform_scale(2.0);
        let child = Transform::from_xyz(0.0, 0.0, 1.0);
        let world = parent.then(&child);
        assert!(world.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        assert_eq!(world.scale, Vec3::splat(2.0));
    }

    #[test]
    fn then_matches_matrix_product() {
        let parent = Transform::from_xyz(-3.0, 0.0, 1.5).with_yaw(0.25);
        let child = Transform::from_xyz(0.2, 0.9, 1.2).with_euler(PI, PI / 4.0, 0.0);
        let composed = parent.then(&child).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        assert!(composed.abs_diff_eq(product, 1e-5));
    }

    #[test]
    fn parse_hex_color() {
        let c = Color::hex("#cbd3d1").unwrap();
        assert!((c.r - 203.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 211.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 209.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.to_hex(), "#cbd3d1");
    }

    #[test]
    fn reject_bad_hex() {
        assert!(Color::hex("#fff").is_err());
        assert!(Color::hex("#gggggg").is_err());
        assert!(Color::hex("#+fffff").is_err());
        assert!(Color::hex("+fffff").is_err());
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let white = Color::WHITE.to_linear();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }
}
