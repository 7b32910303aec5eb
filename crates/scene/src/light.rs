use glam::Vec3;
use serde::{Deserialize, Serialize};
use village_common::Color;

/// Orthographic shadow frustum for a directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half extent of the square frustum (left = -extent, right = extent, ...).
    pub extent: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 1024,
            near: 1.0,
            far: 30.0,
            extent: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Uniform fill with no direction.
    Ambient,
    /// Parallel rays travelling from the node position towards `target`.
    Directional { target: Vec3, shadow: ShadowConfig },
    /// Omni light fading to zero at `distance` (0 means unbounded).
    Point { distance: f32 },
}

/// A light attached to a scene node. Position comes from the node's world transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
            cast_shadow: false,
        }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional {
                target: Vec3::ZERO,
                shadow: ShadowConfig::default(),
            },
            color,
            intensity,
            cast_shadow: false,
        }
    }

    pub fn point(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            kind: LightKind::Point { distance },
            color,
            intensity,
            cast_shadow: false,
        }
    }

    pub fn with_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// Replace the shadow frustum. No effect on non-directional lights.
    pub fn with_shadow_config(mut self, config: ShadowConfig) -> Self {
        if let LightKind::Directional { ref mut shadow, .. } = self.kind {
            *shadow = config;
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            LightKind::Ambient => "ambient",
            LightKind::Directional { .. } => "directional",
            LightKind::Point { .. } => "point",
        }
    }

    /// Linear RGB scaled by intensity.
    pub fn radiance(&self) -> [f32; 3] {
        let [r, g, b] = self.color.to_linear();
        [r * self.intensity, g * self.intensity, b * self.intensity]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_defaults() {
        let config = ShadowConfig::default();
        assert_eq!(config.map_size, 1024);
        assert_eq!((config.near, config.far, config.extent), (1.0, 30.0, 15.0));
    }

    #[test]
    fn shadow_config_ignored_for_point() {
        let light = Light::point(Color::WHITE, 1.2, 6.0).with_shadow_config(ShadowConfig {
            map_size: 512,
            ..ShadowConfig::default()
        });
        assert_eq!(light.kind, LightKind::Point { distance: 6.0 });
    }

    #[test]
    fn radiance_scales_with_intensity() {
        let light = Light::ambient(Color::WHITE, 0.45);
        assert!(light.radiance().iter().all(|c| (c - 0.45).abs() < 1e-6));
    }
}
