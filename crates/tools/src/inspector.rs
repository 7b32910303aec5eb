use std::fmt;
use village_common::NodeId;
use village_props::VillageHandles;
use village_scene::Scene;

/// Scene inspector for developer tooling.
///
/// Read-only queries against a scene for the CLI and the debug panel.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut drawables = 0;
        scene.visit_drawables(|_| drawables += 1);
        let lights = scene
            .lights()
            .iter()
            .map(|(_, light, _)| light.kind_name())
            .collect();
        tracing::debug!(drawables, "scene inspected");
        SceneSummary {
            node_count: scene.node_count(),
            reachable: scene.reachable_count(),
            drawables,
            shapes: scene.catalog().shape_count(),
            paints: scene.catalog().paint_count(),
            lights,
            fog: scene.fog.map(|f| (f.near, f.far)),
            background: scene.background.to_hex(),
        }
    }

    /// Direct child count of each named village group.
    pub fn group_counts(scene: &Scene, handles: &VillageHandles) -> Vec<GroupCount> {
        [
            ("cobbles", handles.cobbles),
            ("cottages", handles.cottages),
            ("stalls", handles.stalls),
            ("trees", handles.trees),
            ("details", handles.details),
        ]
        .into_iter()
        .map(|(name, id)| GroupCount {
            name,
            count: scene.children(id).len(),
        })
        .collect()
    }

    /// Describe one node, with its world position.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.get(id)?;
        let world = scene.world_transform(id).ok()?;
        let mesh = node.mesh.and_then(|m| {
            let shape = scene.catalog().shape(m.shape)?;
            Some(shape.kind())
        });
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            mesh,
            light: node.light.as_ref().map(|l| l.kind_name()),
            world_position: world.position.to_array(),
            children: node.children().len(),
        })
    }

    /// Ids of the nodes reachable from the root, in draw order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        let mut ids = Vec::new();
        scene.walk(|id, _, _| ids.push(id));
        ids
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub node_count: usize,
    pub reachable: usize,
    pub drawables: usize,
    pub shapes: usize,
    pub paints: usize,
    pub lights: Vec<&'static str>,
    pub fog: Option<(f32, f32)>,
    pub background: String,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: nodes={} reachable={} drawables={} shapes={} paints={} lights=[{}] background={}",
            self.node_count,
            self.reachable,
            self.drawables,
            self.shapes,
            self.paints,
            self.lights.join(", "),
            self.background,
        )?;
        match self.fog {
            Some((near, far)) => write!(f, " fog={near:.1}..{far:.1}"),
            None => write!(f, " fog=off"),
        }
    }
}

/// Child count of a named group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCount {
    pub name: &'static str,
    pub count: usize,
}

impl fmt::Display for GroupCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.count)
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub mesh: Option<&'static str>,
    pub light: Option<&'static str>,
    pub world_position: [f32; 3],
    pub children: usize,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {} '{}' pos=({:.2}, {:.2}, {:.2}) children={}",
            self.id,
            self.name,
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
            self.children,
        )?;
        if let Some(kind) = self.mesh {
            write!(f, " mesh={kind}")?;
        }
        if let Some(kind) = self.light {
            write!(f, " light={kind}")?;
        }
        Ok(())
    }
}
