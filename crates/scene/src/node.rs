use serde::{Deserialize, Serialize};
use village_common::{NodeId, Transform};

use crate::catalog::{PaintHandle, ShapeHandle};
use crate::light::Light;

/// A drawable reference: which shape to draw with which paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mesh {
    pub shape: ShapeHandle,
    pub paint: PaintHandle,
}

/// A node in the scene graph.
///
/// Children are owned by id through the scene arena. `parent` is `None` for
/// the root and for nodes that have been spawned but not yet attached.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub light: Option<Light>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// An empty grouping node.
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            light: None,
            cast_shadow: false,
            receive_shadow: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(
        name: impl Into<String>,
        shape: ShapeHandle,
        paint: PaintHandle,
        transform: Transform,
    ) -> Self {
        Self {
            mesh: Some(Mesh { shape, paint }),
            ..Self::group(name, transform)
        }
    }

    pub fn light(name: impl Into<String>, light: Light, transform: Transform) -> Self {
        Self {
            light: Some(light),
            ..Self::group(name, transform)
        }
    }

    pub fn casting(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
