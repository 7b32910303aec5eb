use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use village_common::{NodeId, SceneError, Transform};
use village_scene::{CameraView, Fog, Light, Node, Scene, ShadowConfig};

use crate::cobbles::{add_cobbles, scatter_cobbles};
use crate::factories::{
    CottageHandles, LampHandles, StallHandles, TreeHandles, WellHandles, create_barrel,
    create_cottage, create_lamp, create_stall, create_tree, create_well,
};
use crate::layout::{BARRELS, COTTAGES, STALLS, TREES};
use crate::templates::{PropTemplates, colors};

pub const FOG_NEAR: f32 = 8.0;
pub const FOG_FAR: f32 = 25.0;
pub const AMBIENT_INTENSITY: f32 = 0.45;
pub const SUN_INTENSITY: f32 = 0.7;

/// The village's distance fog, the same every time it is switched on.
pub fn village_fog() -> Fog {
    Fog {
        color: colors::SKY,
        near: FOG_NEAR,
        far: FOG_FAR,
    }
}

/// Construction options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageConfig {
    pub cobble_seed: u64,
    /// Probability that a cobble grid cell holds a disc.
    pub cobble_density: f32,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            cobble_seed: 42,
            cobble_density: 0.15,
        }
    }
}

/// Every node and paint the animation loop and hosts need after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VillageHandles {
    pub templates: PropTemplates,
    pub ambient: NodeId,
    pub sun: NodeId,
    pub ground: NodeId,
    pub cobbles: NodeId,
    pub cottages: NodeId,
    pub stalls: NodeId,
    pub trees: NodeId,
    pub details: NodeId,
    pub cottage_props: Vec<CottageHandles>,
    pub stall_props: Vec<StallHandles>,
    pub tree_props: Vec<TreeHandles>,
    pub well: WellHandles,
    pub lamp: LampHandles,
    pub barrels: Vec<NodeId>,
}

/// A fully assembled village: the scene, its handles and the initial view.
#[derive(Debug, Clone)]
pub struct Village {
    pub scene: Scene,
    pub handles: VillageHandles,
    pub view: CameraView,
    pub cobble_count: usize,
}

fn group(scene: &mut Scene, name: &str) -> Result<NodeId, SceneError> {
    let root = scene.root();
    scene.add(root, Node::group(name, Transform::default()))
}

/// Assemble the whole village from the fixed layout table.
pub fn build_village(config: &VillageConfig) -> Result<Village, SceneError> {
    let mut scene = Scene::new();
    scene.background = colors::SKY;
    scene.fog = Some(village_fog());
    let root = scene.root();
    let templates = PropTemplates::register(scene.catalog_mut())?;

    let ambient = scene.add(
        root,
        Node::light(
            "ambient",
            Light::ambient(colors::AMBIENT, AMBIENT_INTENSITY),
            Transform::default(),
        ),
    )?;
    let sun = scene.add(
        root,
        Node::light(
            "sun",
            Light::directional(colors::SUN, SUN_INTENSITY)
                .with_shadow()
                .with_shadow_config(ShadowConfig::default()),
            Transform::from_xyz(5.0, 10.0, 2.0),
        ),
    )?;

    let ground = scene.add(
        root,
        Node::mesh(
            "ground",
            templates.ground.shape,
            templates.ground.paint,
            Transform::default().with_euler(-FRAC_PI_2, 0.0, 0.0),
        )
        .receiving(),
    )?;

    let cobbles = group(&mut scene, "cobbles")?;
    let positions = scatter_cobbles(config.cobble_seed, config.cobble_density)?;
    let cobble_count = add_cobbles(&mut scene, &templates, cobbles, &positions)?;

    let cottages = group(&mut scene, "cottages")?;
    let mut cottage_props = Vec::with_capacity(COTTAGES.len());
    for entry in &COTTAGES {
        let cottage = create_cottage(
            &mut scene,
            &templates,
            entry.x,
            entry.z,
            entry.rotation,
            entry.scale,
        )?;
        scene.attach(cottages, cottage.root)?;
        cottage_props.push(cottage);
    }

    let well = create_well(&mut scene)?;
    scene.attach(root, well.root)?;

    let stalls = group(&mut scene, "stalls")?;
    let mut stall_props = Vec::with_capacity(STALLS.len());
    for entry in &STALLS {
        let stall = create_stall(&mut scene, &templates, entry.x, entry.z, entry.rotation)?;
        scene.attach(stalls, stall.root)?;
        stall_props.push(stall);
    }

    let lamp = create_lamp(&mut scene)?;
    scene.attach(root, lamp.root)?;

    let trees = group(&mut scene, "trees")?;
    let mut tree_props = Vec::with_capacity(TREES.len());
    for entry in &TREES {
        let tree = create_tree(&mut scene, &templates, entry.x, entry.z, entry.scale)?;
        scene.attach(trees, tree.root)?;
        tree_props.push(tree);
    }

    let details = group(&mut scene, "details")?;
    let mut barrels = Vec::with_capacity(BARRELS.len());
    for position in BARRELS {
        let barrel = create_barrel(&mut scene, &templates, position)?;
        scene.attach(details, barrel)?;
        barrels.push(barrel);
    }

    tracing::info!(
        nodes = scene.node_count(),
        shapes = scene.catalog().shape_count(),
        paints = scene.catalog().paint_count(),
        cobbles = cobble_count,
        seed = config.cobble_seed,
        "village assembled"
    );

    Ok(Village {
        scene,
        handles: VillageHandles {
            templates,
            ambient,
            sun,
            ground,
            cobbles,
            cottages,
            stalls,
            trees,
            details,
            cottage_props,
            stall_props,
            tree_props,
            well,
            lamp,
            barrels,
        },
        view: CameraView::default(),
        cobble_count,
    })
}
