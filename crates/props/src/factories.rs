//! Prop factories.
//!
//! Each factory spawns a detached root group with its parts attached, and
//! returns a handle record naming every part. The caller attaches the root
//! wherever it belongs.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use village_common::{NodeId, SceneError, Transform};
use village_scene::{Light, Node, PaintHandle, PaintTemplate, Scene, ShapeTemplate};

use crate::layout::{LAMP_POSITION, WELL_POSITION};
use crate::templates::{Part, PropTemplates, colors};

/// Roll applied to the well pulley so its axis lies along X.
pub const PULLEY_ROLL: f32 = FRAC_PI_2;
/// Baseline emissive intensity of a cottage window.
pub const WINDOW_GLOW: f32 = 0.9;
pub const LANTERN_GLOW: f32 = 1.0;
pub const LANTERN_LIGHT_INTENSITY: f32 = 1.2;
pub const LANTERN_LIGHT_DISTANCE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CottageHandles {
    pub root: NodeId,
    pub walls: NodeId,
    pub roof: NodeId,
    pub door: NodeId,
    pub window: NodeId,
    pub window_paint: PaintHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellHandles {
    pub root: NodeId,
    pub base: NodeId,
    pub beams: [NodeId; 2],
    pub pulley: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallHandles {
    pub root: NodeId,
    pub table: NodeId,
    pub awning: NodeId,
    pub crate_box: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHandles {
    pub root: NodeId,
    pub trunk: NodeId,
    pub foliage: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampHandles {
    pub root: NodeId,
    pub post: NodeId,
    pub lantern: NodeId,
    pub lantern_paint: PaintHandle,
    pub light: NodeId,
}

fn ground_root(name: &str, x: f32, z: f32, rotation: f32) -> Result<Node, SceneError> {
    let x = SceneError::ensure_finite("x", x)?;
    let z = SceneError::ensure_finite("z", z)?;
    let rotation = SceneError::ensure_finite("rotation", rotation)?;
    Ok(Node::group(
        name,
        Transform::from_xyz(x, 0.0, z).with_yaw(rotation),
    ))
}

fn part(name: &str, part: Part, transform: Transform) -> Node {
    Node::mesh(name, part.shape, part.paint, transform)
}

/// Build a cottage: walls, pyramid roof, door and a glowing window.
pub fn create_cottage(
    scene: &mut Scene,
    templates: &PropTemplates,
    x: f32,
    z: f32,
    rotation: f32,
    scale: f32,
) -> Result<CottageHandles, SceneError> {
    let s = SceneError::ensure_positive("cottage scale", scale)?;
    let root = scene.spawn(ground_root("cottage", x, z, rotation)?);

    let walls = scene.add(
        root,
        part(
            "walls",
            templates.walls,
            Transform::from_xyz(0.0, 0.9 * s, 0.0).with_uniform_scale(s),
        )
        .casting()
        .receiving(),
    )?;
    let roof = scene.add(
        root,
        part(
            "roof",
            templates.roof,
            Transform::from_xyz(0.0, 2.0 * s, 0.0)
                .with_yaw(FRAC_PI_4)
                .with_uniform_scale(1.2 * s),
        )
        .casting(),
    )?;
    let door = scene.add(
        root,
        part(
            "door",
            templates.door,
            Transform::from_xyz(0.0, 0.5 * s, 1.201 * s).with_yaw(PI),
        )
        .casting(),
    )?;

    // each window owns its paint so the glow can be driven per cottage
    let window_part = Part::register(
        scene.catalog_mut(),
        ShapeTemplate::plane(0.5, 0.45)?,
        PaintTemplate::new(colors::WINDOW).with_emissive(colors::WINDOW_GLOW, WINDOW_GLOW)?,
    )?;
    let window = scene.add(
        root,
        part(
            "window",
            window_part,
            Transform::from_xyz(-0.7 * s, 1.2 * s, 1.201 * s).with_yaw(PI),
        ),
    )?;

    tracing::debug!(%root, x, z, scale = s, "built cottage");
    Ok(CottageHandles {
        root,
        walls,
        roof,
        door,
        window,
        window_paint: window_part.paint,
    })
}

/// Build the well: stone base, two crossbeams sharing one part, and a pulley.
pub fn create_well(scene: &mut Scene) -> Result<WellHandles, SceneError> {
    let root = scene.spawn(Node::group(
        "well",
        Transform {
            position: WELL_POSITION,
            ..Transform::default()
        },
    ));

    let catalog = scene.catalog_mut();
    let base_part = Part::register(
        catalog,
        ShapeTemplate::cylinder(0.9, 0.9, 0.6, 24)?,
        PaintTemplate::new(colors::WELL_STONE),
    )?;
    let beam_part = Part::register(
        catalog,
        ShapeTemplate::cuboid(1.8, 0.12, 0.12)?,
        PaintTemplate::new(colors::WELL_BEAM),
    )?;
    let pulley_part = Part::register(
        catalog,
        ShapeTemplate::cylinder(0.08, 0.08, 0.2, 12)?,
        PaintTemplate::new(colors::PULLEY),
    )?;

    let base = scene.add(
        root,
        part("base", base_part, Transform::from_xyz(0.0, 0.3, 0.0)).casting(),
    )?;
    let beam_a = scene.add(
        root,
        part("beam", beam_part, Transform::from_xyz(0.0, 0.85, 0.3)),
    )?;
    let beam_b = scene.add(
        root,
        part("beam", beam_part, Transform::from_xyz(0.0, 0.85, -0.3)),
    )?;
    let pulley = scene.add(
        root,
        part(
            "pulley",
            pulley_part,
            Transform::from_xyz(0.0, 0.9, 0.0).with_euler(0.0, 0.0, PULLEY_ROLL),
        ),
    )?;

    tracing::debug!(%root, "built well");
    Ok(WellHandles {
        root,
        base,
        beams: [beam_a, beam_b],
        pulley,
    })
}

/// Build a market stall: table, upside-down cone awning and a crate.
pub fn create_stall(
    scene: &mut Scene,
    templates: &PropTemplates,
    x: f32,
    z: f32,
    rotation: f32,
) -> Result<StallHandles, SceneError> {
    let root = scene.spawn(ground_root("stall", x, z, rotation)?);

    let table = scene.add(
        root,
        part("table", templates.table, Transform::from_xyz(0.0, 0.8, 0.0)).casting(),
    )?;

    let awning_shape = scene
        .catalog_mut()
        .add_shape(ShapeTemplate::cone(0.9, 0.6, 4)?)?;
    let awning = scene.add(
        root,
        Node::mesh(
            "awning",
            awning_shape,
            templates.awning_paint,
            Transform::from_xyz(0.0, 1.3, 0.0).with_euler(PI, FRAC_PI_4, 0.0),
        ),
    )?;

    let crate_part = Part::register(
        scene.catalog_mut(),
        ShapeTemplate::cuboid(0.35, 0.25, 0.25)?,
        PaintTemplate::new(colors::CRATE),
    )?;
    let crate_box = scene.add(
        root,
        part("crate", crate_part, Transform::from_xyz(0.4, 0.9, 0.2)),
    )?;

    tracing::debug!(%root, x, z, "built stall");
    Ok(StallHandles {
        root,
        table,
        awning,
        crate_box,
    })
}

/// Build a tree. `scale` spaces trunk and foliage vertically; the meshes keep
/// their template size.
pub fn create_tree(
    scene: &mut Scene,
    templates: &PropTemplates,
    x: f32,
    z: f32,
    scale: f32,
) -> Result<TreeHandles, SceneError> {
    let s = SceneError::ensure_positive("tree scale", scale)?;
    let root = scene.spawn(ground_root("tree", x, z, 0.0)?);

    let trunk = scene.add(
        root,
        part("trunk", templates.trunk, Transform::from_xyz(0.0, 0.45 * s, 0.0)).casting(),
    )?;
    let foliage = scene.add(
        root,
        part(
            "foliage",
            templates.foliage,
            Transform::from_xyz(0.0, 1.05 * s, 0.0),
        )
        .casting(),
    )?;

    tracing::debug!(%root, x, z, scale = s, "built tree");
    Ok(TreeHandles {
        root,
        trunk,
        foliage,
    })
}

/// Build the lamp post with its glowing lantern and point light.
pub fn create_lamp(scene: &mut Scene) -> Result<LampHandles, SceneError> {
    let root = scene.spawn(Node::group(
        "lamp",
        Transform {
            position: LAMP_POSITION,
            ..Transform::default()
        },
    ));

    let catalog = scene.catalog_mut();
    let post_part = Part::register(
        catalog,
        ShapeTemplate::cylinder(0.08, 0.08, 2.4, 12)?,
        PaintTemplate::new(colors::POST),
    )?;
    let lantern_part = Part::register(
        catalog,
        ShapeTemplate::cuboid(0.34, 0.4, 0.34)?,
        PaintTemplate::new(colors::LANTERN).with_emissive(colors::LANTERN_GLOW, LANTERN_GLOW)?,
    )?;

    let post = scene.add(
        root,
        part("post", post_part, Transform::from_xyz(0.0, 1.2, 0.0)).casting(),
    )?;
    let lantern = scene.add(
        root,
        part("lantern", lantern_part, Transform::from_xyz(0.0, 2.1, 0.0)).casting(),
    )?;
    let light = scene.add(
        root,
        Node::light(
            "lantern light",
            Light::point(
                colors::LANTERN_GLOW,
                LANTERN_LIGHT_INTENSITY,
                LANTERN_LIGHT_DISTANCE,
            )
            .with_shadow(),
            Transform::from_xyz(0.0, 2.05, 0.0),
        ),
    )?;

    tracing::debug!(%root, "built lamp");
    Ok(LampHandles {
        root,
        post,
        lantern,
        lantern_paint: lantern_part.paint,
        light,
    })
}

/// Place a barrel at `position`. Every barrel shares the same part.
pub fn create_barrel(
    scene: &mut Scene,
    templates: &PropTemplates,
    position: Vec3,
) -> Result<NodeId, SceneError> {
    let transform = Transform {
        position: Vec3::new(
            SceneError::ensure_finite("x", position.x)?,
            SceneError::ensure_finite("y", position.y)?,
            SceneError::ensure_finite("z", position.z)?,
        ),
        ..Transform::default()
    };
    Ok(scene.spawn(part("barrel", templates.barrel, transform).casting()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::EulerRot;

    fn setup() -> (Scene, PropTemplates) {
        let mut scene = Scene::new();
        let templates = PropTemplates::register(scene.catalog_mut()).unwrap();
        (scene, templates)
    }

    fn count_named(scene: &Scene, parent: NodeId, name: &str) -> usize {
        scene
            .children(parent)
            .iter()
            .filter(|c| scene.get(**c).unwrap().name == name)
            .count()
    }

    #[test]
    fn cottage_has_exactly_one_of_each_part() {
        let (mut scene, templates) = setup();
        let cottage = create_cottage(&mut scene, &templates, -3.0, -1.5, PI * 0.08, 1.0).unwrap();
        for name in ["walls", "roof", "door", "window"] {
            assert_eq!(count_named(&scene, cottage.root, name), 1, "{name}");
        }
        assert_eq!(scene.children(cottage.root).len(), 4);
    }

    #[test]
    fn cottage_root_placement() {
        let (mut scene, templates) = setup();
        let cottage = create_cottage(&mut scene, &templates, 3.0, -1.2, PI * 0.12, 1.05).unwrap();
        let root = scene.get(cottage.root).unwrap();
        assert_eq!(root.transform.position, Vec3::new(3.0, 0.0, -1.2));
        let (_, yaw, _) = root.transform.rotation.to_euler(EulerRot::XYZ);
        assert!((yaw - PI * 0.12).abs() < 1e-5);
        assert!(root.parent().is_none());
    }

    #[test]
    fn cottage_parts_scale_with_cottage() {
        let (mut scene, templates) = setup();
        let cottage = create_cottage(&mut scene, &templates, 0.0, 0.0, 0.0, 0.95).unwrap();
        let walls = scene.get(cottage.walls).unwrap();
        assert!((walls.transform.position.y - 0.855).abs() < 1e-6);
        assert_eq!(walls.transform.scale, Vec3::splat(0.95));
        assert!(walls.cast_shadow && walls.receive_shadow);
        let roof = scene.get(cottage.roof).unwrap();
        assert!((roof.transform.scale.x - 1.14).abs() < 1e-6);
        let window = scene.get(cottage.window).unwrap();
        assert!((window.transform.position.x + 0.665).abs() < 1e-6);
    }

    #[test]
    fn cottage_windows_get_their_own_paint() {
        let (mut scene, templates) = setup();
        let a = create_cottage(&mut scene, &templates, 0.0, 0.0, 0.0, 1.0).unwrap();
        let b = create_cottage(&mut scene, &templates, 1.0, 0.0, 0.0, 1.0).unwrap();
        assert_ne!(a.window_paint, b.window_paint);
        let paint = scene.catalog().paint(a.window_paint).unwrap();
        assert_eq!(paint.emissive_intensity, WINDOW_GLOW);
        assert_eq!(paint.emissive, Some(colors::WINDOW_GLOW));
        // walls are shared
        let walls_a = scene.get(a.walls).unwrap().mesh.unwrap();
        let walls_b = scene.get(b.walls).unwrap().mesh.unwrap();
        assert_eq!(walls_a, walls_b);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let (mut scene, templates) = setup();
        let before = scene.node_count();
        assert_eq!(
            create_cottage(&mut scene, &templates, 0.0, 0.0, 0.0, 0.0),
            Err(SceneError::InvalidParameter {
                what: "cottage scale",
                value: 0.0
            })
        );
        assert!(create_tree(&mut scene, &templates, 0.0, 0.0, -1.0).is_err());
        assert!(create_stall(&mut scene, &templates, f32::NAN, 0.0, 0.0).is_err());
        assert_eq!(scene.node_count(), before);
    }

    #[test]
    fn well_beams_share_one_part() {
        let (mut scene, _) = setup();
        let well = create_well(&mut scene).unwrap();
        let [a, b] = well.beams;
        let mesh_a = scene.get(a).unwrap().mesh.unwrap();
        let mesh_b = scene.get(b).unwrap().mesh.unwrap();
        assert_eq!(mesh_a, mesh_b);
        assert_eq!(scene.get(b).unwrap().transform.position.z, -0.3);
        assert_eq!(scene.children(well.root).len(), 4);
    }

    #[test]
    fn pulley_starts_rolled() {
        let (mut scene, _) = setup();
        let well = create_well(&mut scene).unwrap();
        let pulley = scene.get(well.pulley).unwrap();
        let (x, _, z) = pulley.transform.rotation.to_euler(EulerRot::XYZ);
        assert!(x.abs() < 1e-6);
        assert!((z - PULLEY_ROLL).abs() < 1e-6);
    }

    #[test]
    fn stall_crates_are_per_stall() {
        let (mut scene, templates) = setup();
        let a = create_stall(&mut scene, &templates, -2.6, 2.2, PI * 0.15).unwrap();
        let b = create_stall(&mut scene, &templates, 0.8, 2.6, -PI * 0.2).unwrap();
        let crate_a = scene.get(a.crate_box).unwrap().mesh.unwrap();
        let crate_b = scene.get(b.crate_box).unwrap().mesh.unwrap();
        assert_ne!(crate_a.paint, crate_b.paint);
        let table_a = scene.get(a.table).unwrap().mesh.unwrap();
        let table_b = scene.get(b.table).unwrap().mesh.unwrap();
        assert_eq!(table_a, table_b);
    }

    #[test]
    fn tree_spacing_follows_scale() {
        let (mut scene, templates) = setup();
        let tree = create_tree(&mut scene, &templates, -6.0, -2.0, 1.2).unwrap();
        let trunk = scene.get(tree.trunk).unwrap();
        let foliage = scene.get(tree.foliage).unwrap();
        assert!((trunk.transform.position.y - 0.54).abs() < 1e-6);
        assert!((foliage.transform.position.y - 1.26).abs() < 1e-6);
        assert_eq!(trunk.transform.scale, Vec3::ONE);
    }

    #[test]
    fn lamp_light_sits_in_lantern() {
        let (mut scene, _) = setup();
        let lamp = create_lamp(&mut scene).unwrap();
        scene.attach(scene.root(), lamp.root).unwrap();
        let world = scene.world_transform(lamp.light).unwrap();
        assert!(world.position.abs_diff_eq(Vec3::new(-4.0, 2.05, -1.0), 1e-6));
        let light = scene.get(lamp.light).unwrap().light.unwrap();
        assert!(light.cast_shadow);
        assert_eq!(light.intensity, LANTERN_LIGHT_INTENSITY);
        let paint = scene.catalog().paint(lamp.lantern_paint).unwrap();
        assert_eq!(paint.emissive_intensity, LANTERN_GLOW);
    }
}
