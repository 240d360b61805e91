//! Animated bodies and their per-frame angle accumulation.
//!
//! Angles grow without wrapping; only their sines and cosines reach the
//! screen. Every increment is `speed * time_scale * dt`, so a negative time
//! scale runs the system backwards.

use glam::Vec3;

use crate::graph::{NodeId, SceneGraph, Transform, Visual};
use crate::material::Material;
use crate::model::ModelData;
use crate::resources::{ModelHandle, SceneResources};

/// Which local axes a body's spin drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinAxes {
    /// Planets and moons turn about their own Y axis.
    Y,
    /// Asteroids tumble: Y and X both advance by the spin angle.
    YX,
}

/// An orbit pivot with one body below it.
#[derive(Clone, Debug)]
pub struct OrbitingBody {
    pub name: String,
    pub pivot: NodeId,
    pub body: NodeId,
    pub orbital_speed: f32,
    pub spin_speed: f32,
    pub material: Material,
    radius: f32,
    orbit_distance: f32,
    orbit_angle: f32,
    spin_angle: f32,
    spin_axes: SpinAxes,
}

impl OrbitingBody {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        pivot: NodeId,
        body: NodeId,
        radius: f32,
        orbit_distance: f32,
        orbital_speed: f32,
        spin_speed: f32,
        material: Material,
        initial_orbit_angle: f32,
        spin_axes: SpinAxes,
    ) -> Self {
        Self {
            name,
            pivot,
            body,
            orbital_speed,
            spin_speed,
            material,
            radius,
            orbit_distance,
            orbit_angle: initial_orbit_angle,
            spin_angle: 0.0,
            spin_axes,
        }
    }

    /// Accumulate both angles and write them into the graph.
    pub fn advance(&mut self, graph: &mut SceneGraph, dt: f32, time_scale: f32) {
        let scaled = dt * time_scale;
        self.orbit_angle += self.orbital_speed * scaled;
        self.spin_angle += self.spin_speed * scaled;
        self.sync(graph);
    }

    /// Write the current angles into the pivot and body transforms.
    pub fn sync(&self, graph: &mut SceneGraph) {
        graph.transform_mut(self.pivot).rotation.y = self.orbit_angle;
        let spin = &mut graph.transform_mut(self.body).rotation;
        spin.y = self.spin_angle;
        if self.spin_axes == SpinAxes::YX {
            spin.x = self.spin_angle;
        }
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn orbit_distance(&self) -> f32 {
        self.orbit_distance
    }

    pub fn spin_axes(&self) -> SpinAxes {
        self.spin_axes
    }
}

/// A loaded model orbiting another body.
///
/// The pivot is a root node whose position follows the parent body's world
/// position every frame. Until the model arrives there is nothing to move and
/// [`advance`](Self::advance) does nothing.
#[derive(Clone, Debug)]
pub struct SatelliteBody {
    pub name: String,
    pub pivot: NodeId,
    pub parent_body: NodeId,
    pub model: ModelHandle,
    pub orbital_speed: f32,
    pub spin_speed: f32,
    distance: f32,
    scale: f32,
    height_offset: f32,
    root: Option<NodeId>,
    orbit_angle: f32,
    spin_angle: f32,
}

impl SatelliteBody {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        pivot: NodeId,
        parent_body: NodeId,
        model: ModelHandle,
        distance: f32,
        scale: f32,
        height_offset: f32,
        orbital_speed: f32,
        spin_speed: f32,
    ) -> Self {
        Self {
            name,
            pivot,
            parent_body,
            model,
            orbital_speed,
            spin_speed,
            distance,
            scale,
            height_offset,
            root: None,
            orbit_angle: 0.0,
            spin_angle: 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.root.is_some()
    }

    /// Splice a loaded model under the pivot: one root node at the orbit
    /// offset, and one child per primitive. Returns the root, or the existing
    /// root if the model was already attached.
    pub fn attach_model(
        &mut self,
        graph: &mut SceneGraph,
        resources: &mut SceneResources,
        model: ModelData,
    ) -> NodeId {
        if let Some(root) = self.root {
            return root;
        }
        let transform = Transform::from_translation(Vec3::new(
            self.distance,
            self.height_offset,
            0.0,
        ))
        .with_scale(self.scale);
        let root = graph.add_child(self.pivot, format!("{}-model", self.name), transform, None);

        for (i, primitive) in model.primitives.into_iter().enumerate() {
            let texture = primitive
                .texture
                .map(|data| resources.add_texture(data));
            let material = Material::resolve(texture, Some(primitive.base_color));
            let mesh = resources.add_mesh(primitive.mesh);
            graph.add_child(
                root,
                format!("{}-part-{i}", self.name),
                Transform::default(),
                Some(Visual::lit(mesh, material)),
            );
        }

        self.root = Some(root);
        root
    }

    /// Follow the parent body, then accumulate orbit and spin.
    pub fn advance(&mut self, graph: &mut SceneGraph, dt: f32, time_scale: f32) {
        let Some(root) = self.root else {
            return;
        };
        let center = graph.world_position(self.parent_body);
        graph.transform_mut(self.pivot).translation = center;

        let scaled = dt * time_scale;
        self.orbit_angle += self.orbital_speed * scaled;
        self.spin_angle += self.spin_speed * scaled;
        graph.transform_mut(self.pivot).rotation.y = self.orbit_angle;
        graph.transform_mut(root).rotation.y = self.spin_angle;
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

/// The emissive sun at the origin. Its spin ignores the time scale.
#[derive(Clone, Debug)]
pub struct Sun {
    pub node: NodeId,
    pub spin_speed: f32,
    radius: f32,
    spin_angle: f32,
}

impl Sun {
    pub(crate) fn new(node: NodeId, radius: f32, spin_speed: f32) -> Self {
        Self {
            node,
            spin_speed,
            radius,
            spin_angle: 0.0,
        }
    }

    pub fn advance(&mut self, graph: &mut SceneGraph, dt: f32) {
        self.spin_angle += self.spin_speed * dt;
        graph.transform_mut(self.node).rotation.y = self.spin_angle;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }
}
