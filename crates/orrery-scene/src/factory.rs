//! Builds bodies from parameter records.
//!
//! Planets, the moon and the sun all draw the one unit-radius base sphere,
//! scaled per instance. Each asteroid gets its own coarse, heavily displaced
//! sphere so no two rocks look alike.

use std::path::PathBuf;

use glam::Vec3;
use orrery_mesh::{SphereParams, generate_displaced_sphere_with};
use rand::Rng;

use crate::body::{OrbitingBody, SatelliteBody, SpinAxes, Sun};
use crate::graph::{NodeId, Transform, Visual};
use crate::material::{Color, Material};
use crate::resources::MeshHandle;
use crate::scene::Scene;

/// Parameters shared by planets, moons and asteroids.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyParams {
    pub name: String,
    pub radius: f32,
    pub distance: f32,
    /// Radians per second at time scale 1.
    pub orbital_speed: f32,
    /// Radians per second at time scale 1.
    pub spin_speed: f32,
    pub texture: Option<PathBuf>,
    pub color: Option<Color>,
    pub initial_orbit_angle: f32,
    pub height_offset: f32,
}

impl BodyParams {
    pub fn new(name: impl Into<String>, radius: f32, distance: f32) -> Self {
        Self {
            name: name.into(),
            radius,
            distance,
            orbital_speed: 0.0,
            spin_speed: 0.0,
            texture: None,
            color: None,
            initial_orbit_angle: 0.0,
            height_offset: 0.0,
        }
    }

    pub fn speeds(mut self, orbital_speed: f32, spin_speed: f32) -> Self {
        self.orbital_speed = orbital_speed;
        self.spin_speed = spin_speed;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SatelliteParams {
    pub name: String,
    pub model: PathBuf,
    pub distance: f32,
    pub scale: f32,
    pub orbital_speed: f32,
    pub spin_speed: f32,
    pub height_offset: f32,
}

pub struct BodyFactory {
    base_mesh: MeshHandle,
    asteroid_sphere: SphereParams,
}

impl BodyFactory {
    /// Generate the shared base sphere. `base` and `asteroid` are used at
    /// unit radius whatever radius they carry.
    pub fn new<R: Rng + ?Sized>(
        scene: &mut Scene,
        base: SphereParams,
        asteroid: SphereParams,
        rng: &mut R,
    ) -> Self {
        let base = SphereParams { radius: 1.0, ..base };
        let mesh = generate_displaced_sphere_with(&base, rng);
        Self {
            base_mesh: scene.resources.add_mesh(mesh),
            asteroid_sphere: SphereParams {
                radius: 1.0,
                ..asteroid
            },
        }
    }

    pub fn base_mesh(&self) -> MeshHandle {
        self.base_mesh
    }

    fn material(scene: &mut Scene, params: &BodyParams) -> Material {
        let texture = params
            .texture
            .as_ref()
            .map(|path| scene.request_texture(path.clone()));
        Material::resolve(texture, params.color)
    }

    fn assemble(
        scene: &mut Scene,
        params: &BodyParams,
        mesh: MeshHandle,
        material: Material,
        spin_axes: SpinAxes,
    ) -> OrbitingBody {
        let pivot = scene.graph.add_node(
            format!("{}-orbit", params.name),
            Transform::default(),
            None,
        );
        let body = scene.graph.add_child(
            pivot,
            params.name.clone(),
            Transform::from_translation(Vec3::new(params.distance, params.height_offset, 0.0))
                .with_scale(params.radius),
            Some(Visual::lit(mesh, material)),
        );
        let body = OrbitingBody::new(
            params.name.clone(),
            pivot,
            body,
            params.radius,
            params.distance,
            params.orbital_speed,
            params.spin_speed,
            material,
            params.initial_orbit_angle,
            spin_axes,
        );
        body.sync(&mut scene.graph);
        body
    }

    /// A planet orbiting the origin.
    pub fn make_planet(&self, scene: &mut Scene, params: &BodyParams) -> OrbitingBody {
        let material = Self::material(scene, params);
        Self::assemble(scene, params, self.base_mesh, material, SpinAxes::Y)
    }

    /// A moon whose orbit pivot hangs below `host`.
    pub fn make_moon(&self, scene: &mut Scene, params: &BodyParams, host: NodeId) -> OrbitingBody {
        let moon = self.make_planet(scene, params);
        scene.graph.attach(moon.pivot, host);
        moon
    }

    /// An irregular rock with its own freshly generated mesh.
    pub fn make_asteroid<R: Rng + ?Sized>(
        &self,
        scene: &mut Scene,
        params: &BodyParams,
        rng: &mut R,
    ) -> OrbitingBody {
        let mesh = generate_displaced_sphere_with(&self.asteroid_sphere, rng);
        let mesh = scene.resources.add_mesh(mesh);
        let material = Self::material(scene, params);
        Self::assemble(scene, params, mesh, material, SpinAxes::YX)
    }

    /// An empty pivot that follows `parent_body` once its model has loaded.
    pub fn make_orbiting_model(
        &self,
        scene: &mut Scene,
        params: &SatelliteParams,
        parent_body: NodeId,
    ) -> SatelliteBody {
        let pivot = scene.graph.add_node(
            format!("{}-orbit", params.name),
            Transform::default(),
            None,
        );
        let model = scene.request_model(params.model.clone());
        SatelliteBody::new(
            params.name.clone(),
            pivot,
            parent_body,
            model,
            params.distance,
            params.scale,
            params.height_offset,
            params.orbital_speed,
            params.spin_speed,
        )
    }

    /// The emissive sun at the origin.
    pub fn make_sun(
        &self,
        scene: &mut Scene,
        radius: f32,
        texture: Option<PathBuf>,
        spin_speed: f32,
    ) -> Sun {
        let texture = texture.map(|path| scene.request_texture(path));
        let visual = Visual {
            mesh: self.base_mesh,
            material: Material::resolve(texture, None),
            emissive: true,
        };
        let node = scene.graph.add_node(
            "sun",
            Transform::default().with_scale(radius),
            Some(visual),
        );
        Sun::new(node, radius, spin_speed)
    }
}
