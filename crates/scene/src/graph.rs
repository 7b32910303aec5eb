use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use village_common::{Color, NodeId, SceneError, Transform};

use crate::catalog::{Catalog, PaintTemplate, ShapeTemplate};
use crate::light::Light;
use crate::node::{Mesh, Node};

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn linear(color: Color, near: f32, far: f32) -> Result<Self, SceneError> {
        let near = SceneError::ensure_finite("fog near", near)?;
        let far = SceneError::ensure_finite("fog far", far)?;
        if far <= near {
            return Err(SceneError::InvalidParameter {
                what: "fog far",
                value: far,
            });
        }
        Ok(Self { color, near, far })
    }

    /// Fog blend factor at `distance`: 0 before `near`, 1 past `far`.
    pub fn factor(&self, distance: f32) -> f32 {
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// A drawable node resolved to world space.
#[derive(Debug, Clone, Copy)]
pub struct Drawable<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub mesh: Mesh,
    pub shape: &'a ShapeTemplate,
    pub paint: &'a PaintTemplate,
    pub world: Transform,
}

/// The scene graph: a tree of nodes rooted at `root`, plus the shared
/// template catalog and the environment (background and fog).
///
/// Nodes live in a BTreeMap arena keyed by monotonic ids. Spawned nodes are
/// detached until `attach` links them under a parent; only nodes reachable
/// from the root are drawn.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    catalog: Catalog,
    pub background: Color,
    pub fog: Option<Fog>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding only an empty root group.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::group("root", Transform::default()));
        Self {
            nodes,
            root,
            next_id: 1,
            catalog: Catalog::new(),
            background: Color::BLACK,
            fog: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Total nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    /// Insert a detached node and return its id.
    pub fn spawn(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = None;
        node.children.clear();
        tracing::debug!(%id, name = %node.name, "spawned node");
        self.nodes.insert(id, node);
        id
    }

    /// Link `child` under `parent`.
    ///
    /// Fails if either id is unknown, if the child already has a parent (or
    /// is the root), or if the link would close a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let child_node = self.nodes.get(&child).ok_or(SceneError::UnknownNode(child))?;
        if child_node.parent.is_some() || child == self.root {
            return Err(SceneError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CycleDetected { parent, child });
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Spawn `node` and attach it under `parent` in one step.
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = self.spawn(node);
        self.attach(parent, id)?;
        Ok(id)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// First direct child of `parent` with the given name.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.nodes.get(c).is_some_and(|n| n.name == name))
    }

    /// Mutable access to a node's light, if it has one.
    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        self.nodes.get_mut(&id).and_then(|n| n.light.as_mut())
    }

    /// Remove `id` and its whole subtree. Returns the number of nodes removed.
    ///
    /// Removing the root empties it but keeps the root node itself.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        if id == self.root {
            let children = node.children.clone();
            let mut removed = 0;
            for child in children {
                removed += self.remove(child)?;
            }
            return Ok(removed);
        }
        let parent = node.parent;
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Compose local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Result<Transform, SceneError> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(next) = current {
            let node = self.node(next)?;
            chain.push(node.transform);
            current = node.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(Transform::default(), |world, local| world.then(local)))
    }

    /// Depth-first walk from the root, calling `visit` with each reachable
    /// node and its world transform. Children are visited in attach order.
    pub fn walk(&self, mut visit: impl FnMut(NodeId, &Node, &Transform)) {
        let mut stack = vec![(self.root, Transform::default())];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let world = parent_world.then(&node.transform);
            visit(id, node, &world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// Visit every reachable node that has a mesh with resolvable handles.
    pub fn visit_drawables(&self, mut visit: impl FnMut(Drawable<'_>)) {
        self.walk(|id, node, world| {
            let Some(mesh) = node.mesh else {
                return;
            };
            match (self.catalog.shape(mesh.shape), self.catalog.paint(mesh.paint)) {
                (Some(shape), Some(paint)) => visit(Drawable {
                    id,
                    node,
                    mesh,
                    shape,
                    paint,
                    world: *world,
                }),
                _ => tracing::warn!(%id, "node references an unknown template"),
            }
        });
    }

    /// Every reachable light with its world transform.
    pub fn lights(&self) -> Vec<(NodeId, Light, Transform)> {
        let mut lights = Vec::new();
        self.walk(|id, node, world| {
            if let Some(light) = node.light {
                lights.push((id, light, *world));
            }
        });
        lights
    }

    /// Number of nodes reachable from the root, root included.
    pub fn reachable_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _, _| count += 1);
        count
    }

    /// Release every node and template, leaving an empty root.
    pub fn clear(&mut self) {
        let released = self.nodes.len().saturating_sub(1);
        self.nodes.clear();
        self.nodes
            .insert(self.root, Node::group("root", Transform::default()));
        self.catalog.clear();
        self.fog = None;
        tracing::info!(released, "scene cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::PI;

    fn group(name: &str) -> Node {
        Node::group(name, Transform::default())
    }

    #[test]
    fn new_scene_has_only_root() {
        let scene = Scene::new();
        assert_eq!(scene.node_count(), 1);
        assert!(scene.children(scene.root()).is_empty());
    }

    #[test]
    fn add_links_parent_and_child() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add(root, group("a")).unwrap();
        assert_eq!(scene.children(root), &[a]);
        assert_eq!(scene.get(a).unwrap().parent(), Some(root));
    }

    #[test]
    fn attach_twice_is_rejected() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add(root, group("a")).unwrap();
        let b = scene.add(root, group("b")).unwrap();
        assert_eq!(scene.attach(b, a), Err(SceneError::AlreadyAttached(a)));
        assert_eq!(scene.children(b).len(), 0);
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn(group("a"));
        let b = scene.spawn(group("b"));
        scene.attach(a, b).unwrap();
        assert_eq!(
            scene.attach(b, a),
            Err(SceneError::CycleDetected {
                parent: b,
                child: a
            })
        );
        assert_eq!(
            scene.attach(a, a),
            Err(SceneError::CycleDetected {
                parent: a,
                child: a
            })
        );
    }

    #[test]
    fn links_only_change_through_attach() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add(root, group("a")).unwrap();
        let b = scene.add(a, group("b")).unwrap();
        assert_eq!(scene.attach(b, a), Err(SceneError::AlreadyAttached(a)));

        let copy = scene.clone();
        let mut seen = Vec::new();
        copy.walk(|id, _, _| seen.push(id));
        assert_eq!(seen, vec![root, a, b]);
        assert_eq!(copy.reachable_count(), 3);
    }

    #[test]
    fn root_cannot_be_attached() {
        let mut scene = Scene::new();
        let a = scene.spawn(group("a"));
        let root = scene.root();
        assert_eq!(scene.attach(a, root), Err(SceneError::AlreadyAttached(root)));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut scene = Scene::new();
        let ghost = NodeId(99);
        assert_eq!(
            scene.attach(scene.root(), ghost),
            Err(SceneError::UnknownNode(ghost))
        );
        assert!(scene.add(ghost, group("x")).is_err());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn detached_nodes_are_not_drawn() {
        let mut scene = Scene::new();
        let shape = scene
            .catalog_mut()
            .add_shape(ShapeTemplate::cuboid(1.0, 1.0, 1.0).unwrap())
            .unwrap();
        let paint = scene.catalog_mut().add_paint(PaintTemplate::new(Color::WHITE));
        scene.spawn(Node::mesh("loose", shape, paint, Transform::default()));
        let root = scene.root();
        scene
            .add(root, Node::mesh("box", shape, paint, Transform::default()))
            .unwrap();
        let mut drawn = Vec::new();
        scene.visit_drawables(|d| drawn.push(d.node.name.clone()));
        assert_eq!(drawn, vec!["box".to_string()]);
    }

    #[test]
    fn world_transform_composes_chain() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = scene
            .add(
                root,
                Node::group(
                    "parent",
                    Transform::from_xyz(3.0, 0.0, 0.0).with_uniform_scale(2.0),
                ),
            )
            .unwrap();
        let child = scene
            .add(parent, Node::group("child", Transform::from_xyz(0.0, 1.0, 0.0)))
            .unwrap();
        let world = scene.world_transform(child).unwrap();
        assert!(world.position.abs_diff_eq(Vec3::new(3.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn walk_matches_world_transform() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = scene
            .add(
                root,
                Node::group("p", Transform::from_xyz(1.0, 0.0, 2.0).with_yaw(PI / 3.0)),
            )
            .unwrap();
        let child = scene
            .add(parent, Node::group("c", Transform::from_xyz(0.5, 0.5, 0.5)))
            .unwrap();
        let mut walked = None;
        scene.walk(|id, _, world| {
            if id == child {
                walked = Some(*world);
            }
        });
        let direct = scene.world_transform(child).unwrap();
        assert!(walked.unwrap().position.abs_diff_eq(direct.position, 1e-6));
    }

    #[test]
    fn remove_drops_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add(root, group("a")).unwrap();
        scene.add(a, group("a1")).unwrap();
        scene.add(a, group("a2")).unwrap();
        assert_eq!(scene.remove(a).unwrap(), 3);
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn find_child_by_name() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add(root, group("walls")).unwrap();
        assert_eq!(scene.find_child(root, "walls"), Some(a));
        assert_eq!(scene.find_child(root, "roof"), None);
    }

    #[test]
    fn lights_are_collected_in_world_space() {
        let mut scene = Scene::new();
        let root = scene.root();
        let lamp = scene
            .add(root, Node::group("lamp", Transform::from_xyz(-4.0, 0.0, -1.0)))
            .unwrap();
        scene
            .add(
                lamp,
                Node::light(
                    "light",
                    Light::point(Color::WHITE, 1.2, 6.0),
                    Transform::from_xyz(0.0, 2.05, 0.0),
                ),
            )
            .unwrap();
        let lights = scene.lights();
        assert_eq!(lights.len(), 1);
        assert!(lights[0]
            .2
            .position
            .abs_diff_eq(Vec3::new(-4.0, 2.05, -1.0), 1e-6));
    }

    #[test]
    fn fog_factor_is_linear() {
        let fog = Fog::linear(Color::WHITE, 8.0, 25.0).unwrap();
        assert_eq!(fog.factor(5.0), 0.0);
        assert_eq!(fog.factor(30.0), 1.0);
        assert!((fog.factor(16.5) - 0.5).abs() < 1e-6);
        assert!(Fog::linear(Color::WHITE, 25.0, 8.0).is_err());
    }

    #[test]
    fn clear_leaves_empty_root() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add(root, group("a")).unwrap();
        scene.catalog_mut().add_paint(PaintTemplate::new(Color::WHITE));
        scene.fog = Some(Fog::linear(Color::WHITE, 1.0, 2.0).unwrap());
        scene.clear();
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.reachable_count(), 1);
        assert_eq!(scene.catalog().paint_count(), 0);
        assert!(scene.fog.is_none());
    }
}
