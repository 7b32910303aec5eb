use village_common::SceneError;
use village_scene::{Catalog, PaintHandle, PaintTemplate, ShapeHandle, ShapeTemplate};

/// A registered shape and the paint it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub shape: ShapeHandle,
    pub paint: PaintHandle,
}

impl Part {
    pub fn register(
        catalog: &mut Catalog,
        shape: ShapeTemplate,
        paint: PaintTemplate,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            shape: catalog.add_shape(shape)?,
            paint: catalog.add_paint(paint),
        })
    }
}

pub mod colors {
    use village_common::Color;

    pub const SKY: Color = Color::from_u32(0xcbd3d1);
    pub const GROUND: Color = Color::from_u32(0x6b6b58);
    pub const COBBLE: Color = Color::from_u32(0x7a7568);
    pub const WALL: Color = Color::from_u32(0xd9c8b0);
    pub const ROOF: Color = Color::from_u32(0x6b2b2b);
    pub const DOOR: Color = Color::from_u32(0x4b2f2f);
    pub const WINDOW: Color = Color::from_u32(0xffcfa6);
    pub const WINDOW_GLOW: Color = Color::from_u32(0xffd27a);
    pub const WELL_STONE: Color = Color::from_u32(0x8b7d6a);
    pub const WELL_BEAM: Color = Color::from_u32(0x5a3b2b);
    pub const PULLEY: Color = Color::from_u32(0x2e2e2e);
    pub const TABLE: Color = Color::from_u32(0x7a5235);
    pub const AWNING: Color = Color::from_u32(0xd34b3b);
    pub const CRATE: Color = Color::from_u32(0xd1a173);
    pub const POST: Color = Color::from_u32(0x2b2b2b);
    pub const LANTERN: Color = Color::from_u32(0xfff1d0);
    pub const LANTERN_GLOW: Color = Color::from_u32(0xffd98a);
    pub const TRUNK: Color = Color::from_u32(0x6b3b20);
    pub const FOLIAGE: Color = Color::from_u32(0x2e6b2e);
    pub const BARREL: Color = Color::from_u32(0x7b4f2b);
    pub const AMBIENT: Color = Color::WHITE;
    pub const SUN: Color = Color::from_u32(0xfff6d8);
}

/// Shapes and paints shared by every instance of a prop.
///
/// Registered once per scene. One-off parts (well, lamp) and per-instance
/// parts (cottage windows, stall awnings and crates) are registered by
/// their factories instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropTemplates {
    pub ground: Part,
    pub cobble: Part,
    pub walls: Part,
    pub roof: Part,
    pub door: Part,
    pub table: Part,
    pub awning_paint: PaintHandle,
    pub trunk: Part,
    pub foliage: Part,
    pub barrel: Part,
}

impl PropTemplates {
    pub fn register(catalog: &mut Catalog) -> Result<Self, SceneError> {
        let templates = Self {
            ground: Part::register(
                catalog,
                ShapeTemplate::plane(40.0, 40.0)?,
                PaintTemplate::new(colors::GROUND),
            )?,
            cobble: Part::register(
                catalog,
                ShapeTemplate::circle(0.25, 12)?,
                PaintTemplate::new(colors::COBBLE),
            )?,
            walls: Part::register(
                catalog,
                ShapeTemplate::cuboid(2.4, 1.8, 2.4)?,
                PaintTemplate::new(colors::WALL),
            )?,
            roof: Part::register(
                catalog,
                ShapeTemplate::cone(1.6, 1.2, 4)?,
                PaintTemplate::new(colors::ROOF).with_roughness(0.9)?,
            )?,
            door: Part::register(
                catalog,
                ShapeTemplate::plane(0.6, 1.1)?,
                PaintTemplate::new(colors::DOOR),
            )?,
            table: Part::register(
                catalog,
                ShapeTemplate::cuboid(1.6, 0.2, 0.9)?,
                PaintTemplate::new(colors::TABLE),
            )?,
            awning_paint: catalog.add_paint(PaintTemplate::new(colors::AWNING)),
            trunk: Part::register(
                catalog,
                ShapeTemplate::cylinder(0.12, 0.12, 0.9, 8)?,
                PaintTemplate::new(colors::TRUNK),
            )?,
            foliage: Part::register(
                catalog,
                ShapeTemplate::cone(0.8, 1.2, 8)?,
                PaintTemplate::new(colors::FOLIAGE),
            )?,
            barrel: Part::register(
                catalog,
                ShapeTemplate::cylinder(0.2, 0.2, 0.4, 12)?,
                PaintTemplate::new(colors::BARREL),
            )?,
        };
        tracing::debug!(
            shapes = catalog.shape_count(),
            paints = catalog.paint_count(),
            "registered shared prop templates"
        );
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_common::Color;

    #[test]
    fn shared_templates_are_registered_once() {
        let mut catalog = Catalog::new();
        let templates = PropTemplates::register(&mut catalog).unwrap();
        assert_eq!(catalog.shape_count(), 9);
        assert_eq!(catalog.paint_count(), 10);
        assert_eq!(
            catalog.shape(templates.cobble.shape),
            Some(&ShapeTemplate::Circle {
                radius: 0.25,
                segments: 12
            })
        );
        assert_eq!(catalog.paint(templates.roof.paint).unwrap().roughness, 0.9);
    }

    #[test]
    fn sky_color_matches_hex() {
        assert_eq!(colors::SKY, Color::hex("#cbd3d1").unwrap());
    }
}
