//! Transform hierarchy for the orrery.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A node's world
//! matrix is its parent's world matrix times its local [`Transform`]. Orbit
//! pivots are nodes without a [`Visual`]; bodies hang below them, offset by
//! their orbit distance.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::material::Material;
use crate::resources::MeshHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Local transform. Rotation is Euler angles in radians applied in XYZ order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.translation)
    }
}

/// What the renderer draws at a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    pub mesh: MeshHandle,
    pub material: Material,
    /// Emissive surfaces ignore the light and glow at the configured emission.
    pub emissive: bool,
}

impl Visual {
    pub fn lit(mesh: MeshHandle, material: Material) -> Self {
        Self {
            mesh,
            material,
            emissive: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visual: Option<Visual>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed scene graph. Nodes are never removed.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        visual: Option<Visual>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.into(),
            transform,
            visual,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Add a node directly below `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        visual: Option<Visual>,
    ) -> NodeId {
        let id = self.add_node(name, transform, visual);
        self.attach(id, parent);
        id
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    ///
    /// Attaching to the current parent changes nothing. Attaching a node
    /// below itself or one of its descendants is refused and returns false.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if self.nodes[child.0 as usize].parent == Some(parent) {
            return true;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }
        if let Some(old) = self.nodes[child.0 as usize].parent {
            self.nodes[old.0 as usize].children.retain(|&c| c != child);
        }
        self.nodes[child.0 as usize].parent = Some(parent);
        self.nodes[parent.0 as usize].children.push(child);
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes[id.0 as usize].parent;
        }
        false
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn transform(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0 as usize].transform
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0 as usize].transform
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0 as usize].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0 as usize].children
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| NodeId(i as u32))
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.transform(id).matrix();
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            matrix = self.transform(parent).matrix() * matrix;
            cursor = self.parent(parent);
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// Call `f` with the world matrix of every node that has a visual.
    /// Parents are visited before their children.
    pub fn visit_visuals(&self, mut f: impl FnMut(Mat4, &Visual)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots()
            .map(|id| (id, Mat4::IDENTITY))
            .collect();
        stack.reverse();

        while let Some((id, parent_world)) = stack.pop() {
            let node = self.node(id);
            let world = parent_world * node.transform.matrix();
            if let Some(visual) = &node.visual {
                f(world, visual);
            }
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}
