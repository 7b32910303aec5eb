//! Shared shape and paint templates.
//!
//! Templates are registered once and referenced by handle from any number of
//! nodes. Shapes are immutable after registration; paints can be mutated, and
//! the change is seen by every node that references the paint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use village_common::{Color, SceneError};

/// A handle referencing a shape template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(pub u64);

/// A handle referencing a paint template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaintHandle(pub u64);

/// Immutable geometric description.
///
/// Conventions: boxes, cones and cylinders are centered on the origin with
/// height along +Y; planes and circles lie in the XY plane facing +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeTemplate {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Circle {
        radius: f32,
        segments: u32,
    },
}

impl ShapeTemplate {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Result<Self, SceneError> {
        Ok(Self::Box {
            width: SceneError::ensure_positive("box width", width)?,
            height: SceneError::ensure_positive("box height", height)?,
            depth: SceneError::ensure_positive("box depth", depth)?,
        })
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Result<Self, SceneError> {
        Ok(Self::Cone {
            radius: SceneError::ensure_positive("cone radius", radius)?,
            height: SceneError::ensure_positive("cone height", height)?,
            radial_segments: ensure_segments("cone segments", radial_segments)?,
        })
    }

    /// One of the two radii may be zero, not both.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Result<Self, SceneError> {
        let radius_top = ensure_non_negative("cylinder top radius", radius_top)?;
        let radius_bottom = ensure_non_negative("cylinder bottom radius", radius_bottom)?;
        if radius_top == 0.0 && radius_bottom == 0.0 {
            return Err(SceneError::InvalidParameter {
                what: "cylinder radius",
                value: 0.0,
            });
        }
        Ok(Self::Cylinder {
            radius_top,
            radius_bottom,
            height: SceneError::ensure_positive("cylinder height", height)?,
            radial_segments: ensure_segments("cylinder segments", radial_segments)?,
        })
    }

    pub fn plane(width: f32, height: f32) -> Result<Self, SceneError> {
        Ok(Self::Plane {
            width: SceneError::ensure_positive("plane width", width)?,
            height: SceneError::ensure_positive("plane height", height)?,
        })
    }

    pub fn circle(radius: f32, segments: u32) -> Result<Self, SceneError> {
        Ok(Self::Circle {
            radius: SceneError::ensure_positive("circle radius", radius)?,
            segments: ensure_segments("circle segments", segments)?,
        })
    }

    /// Re-run the constructor checks, for templates built as literals.
    pub fn validate(&self) -> Result<(), SceneError> {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => Self::cuboid(width, height, depth),
            Self::Cone {
                radius,
                height,
                radial_segments,
            } => Self::cone(radius, height, radial_segments),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => Self::cylinder(radius_top, radius_bottom, height, radial_segments),
            Self::Plane { width, height } => Self::plane(width, height),
            Self::Circle { radius, segments } => Self::circle(radius, segments),
        }
        .map(|_| ())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Cone { .. } => "cone",
            Self::Cylinder { .. } => "cylinder",
            Self::Plane { .. } => "plane",
            Self::Circle { .. } => "circle",
        }
    }

    /// Flat shapes have no back faces of their own.
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Plane { .. } | Self::Circle { .. })
    }
}

fn ensure_segments(what: &'static str, segments: u32) -> Result<u32, SceneError> {
    if segments >= 3 {
        Ok(segments)
    } else {
        Err(SceneError::InvalidParameter {
            what,
            value: segments as f32,
        })
    }
}

fn ensure_non_negative(what: &'static str, value: f32) -> Result<f32, SceneError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidParameter { what, value })
    }
}

/// Surface appearance: base color, roughness and optional emissive glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintTemplate {
    pub color: Color,
    pub roughness: f32,
    pub emissive: Option<Color>,
    pub emissive_intensity: f32,
}

impl PaintTemplate {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            roughness: 1.0,
            emissive: None,
            emissive_intensity: 1.0,
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Result<Self, SceneError> {
        if !(0.0..=1.0).contains(&roughness) {
            return Err(SceneError::InvalidParameter {
                what: "roughness",
                value: roughness,
            });
        }
        self.roughness = roughness;
        Ok(self)
    }

    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Result<Self, SceneError> {
        self.emissive = Some(emissive);
        self.emissive_intensity = ensure_non_negative("emissive intensity", intensity)?;
        Ok(self)
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive.is_some()
    }

    /// Emitted radiance as linear RGB, zero when the paint does not glow.
    pub fn emitted(&self) -> [f32; 3] {
        match self.emissive {
            Some(color) => {
                let [r, g, b] = color.to_linear();
                let k = self.emissive_intensity;
                [r * k, g * k, b * k]
            }
            None => [0.0; 3],
        }
    }
}

/// Registry of all shape and paint templates used by a scene.
///
/// Uses BTreeMap for deterministic iteration. Handles are never reused.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    shapes: BTreeMap<ShapeHandle, ShapeTemplate>,
    paints: BTreeMap<PaintHandle, PaintTemplate>,
    next_shape: u64,
    next_paint: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape template and return its handle.
    pub fn add_shape(&mut self, shape: ShapeTemplate) -> Result<ShapeHandle, SceneError> {
        shape.validate()?;
        let handle = ShapeHandle(self.next_shape);
        self.next_shape += 1;
        self.shapes.insert(handle, shape);
        tracing::debug!(handle = handle.0, kind = shape.kind(), "registered shape");
        Ok(handle)
    }

    /// Register a paint template and return its handle.
    pub fn add_paint(&mut self, paint: PaintTemplate) -> PaintHandle {
        let handle = PaintHandle(self.next_paint);
        self.next_paint += 1;
        self.paints.insert(handle, paint);
        handle
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&ShapeTemplate> {
        self.shapes.get(&handle)
    }

    pub fn paint(&self, handle: PaintHandle) -> Option<&PaintTemplate> {
        self.paints.get(&handle)
    }

    pub fn paint_mut(&mut self, handle: PaintHandle) -> Option<&mut PaintTemplate> {
        self.paints.get_mut(&handle)
    }

    /// Set the emissive intensity of a paint. Every node using it sees the change.
    pub fn set_emissive_intensity(
        &mut self,
        handle: PaintHandle,
        intensity: f32,
    ) -> Result<(), SceneError> {
        let paint = self
            .paints
            .get_mut(&handle)
            .ok_or(SceneError::UnknownPaint(handle.0))?;
        paint.emissive_intensity = intensity.max(0.0);
        Ok(())
    }

    pub fn shapes(&self) -> &BTreeMap<ShapeHandle, ShapeTemplate> {
        &self.shapes
    }

    pub fn paints(&self) -> &BTreeMap<PaintHandle, PaintTemplate> {
        &self.paints
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn paint_count(&self) -> usize {
        self.paints.len()
    }

    /// Drop every template. Handles issued before stay invalid.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.paints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_non_positive_dimensions() {
        assert!(ShapeTemplate::cuboid(0.0, 1.0, 1.0).is_err());
        assert!(ShapeTemplate::cone(-1.0, 1.0, 4).is_err());
        assert!(ShapeTemplate::plane(1.0, f32::NAN).is_err());
        assert!(ShapeTemplate::circle(0.25, 2).is_err());
        assert!(ShapeTemplate::cylinder(0.0, 0.0, 1.0, 8).is_err());
    }

    #[test]
    fn cylinder_allows_one_zero_radius() {
        let shape = ShapeTemplate::cylinder(0.0, 0.5, 1.0, 8).unwrap();
        assert_eq!(shape.kind(), "cylinder");
    }

    #[test]
    fn literal_templates_are_validated_on_registration() {
        let mut catalog = Catalog::new();
        let bad = ShapeTemplate::Box {
            width: 1.0,
            height: -2.0,
            depth: 1.0,
        };
        assert_eq!(
            catalog.add_shape(bad),
            Err(SceneError::InvalidParameter {
                what: "box height",
                value: -2.0
            })
        );
        assert_eq!(catalog.shape_count(), 0);
    }

    #[test]
    fn handles_are_unique() {
        let mut catalog = Catalog::new();
        let a = catalog
            .add_shape(ShapeTemplate::cuboid(1.0, 1.0, 1.0).unwrap())
            .unwrap();
        let b = catalog
            .add_shape(ShapeTemplate::cuboid(1.0, 1.0, 1.0).unwrap())
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(catalog.shape_count(), 2);
    }

    #[test]
    fn paint_mutation_is_shared() {
        let mut catalog = Catalog::new();
        let glow = PaintTemplate::new(Color::WHITE)
            .with_emissive(Color::WHITE, 0.9)
            .unwrap();
        let handle = catalog.add_paint(glow);
        catalog.set_emissive_intensity(handle, 1.02).unwrap();
        assert_eq!(catalog.paint(handle).unwrap().emissive_intensity, 1.02);
    }

    #[test]
    fn unknown_paint_is_an_error() {
        let mut catalog = Catalog::new();
        assert_eq!(
            catalog.set_emissive_intensity(PaintHandle(7), 1.0),
            Err(SceneError::UnknownPaint(7))
        );
    }

    #[test]
    fn roughness_range() {
        let paint = PaintTemplate::new(Color::BLACK);
        assert!(paint.with_roughness(0.9).is_ok());
        assert!(paint.with_roughness(1.5).is_err());
    }

    #[test]
    fn emitted_is_zero_without_emissive() {
        assert_eq!(PaintTemplate::new(Color::WHITE).emitted(), [0.0; 3]);
        let glow = PaintTemplate::new(Color::BLACK)
            .with_emissive(Color::WHITE, 2.0)
            .unwrap();
        assert!(glow.emitted().iter().all(|c| (c - 2.0).abs() < 1e-5));
    }
}
