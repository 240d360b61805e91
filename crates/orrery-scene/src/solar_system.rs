//! Assembly of the full orrery and its per-frame animation.

use std::path::PathBuf;

use glam::Vec3;
use orrery_mesh::SphereParams;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::body::{OrbitingBody, SatelliteBody, Sun};
use crate::catalog::{self, MOON, MOON_HOST, PLANETS, SATELLITES};
use crate::factory::BodyFactory;
use crate::resources::TextureHandle;
use crate::scene::Scene;

/// Construction-time knobs, usually filled from the config file.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSettings {
    pub sun_radius: f32,
    /// Segments and displacement of the shared body sphere.
    pub sphere: SphereParams,
    pub asteroid_count: usize,
    pub asteroid_sphere: SphereParams,
    /// Equirectangular sky texture, relative to the asset root.
    pub background: Option<PathBuf>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            sun_radius: 4.0,
            sphere: SphereParams::unit(100, 0.01),
            asteroid_count: 1000,
            asteroid_sphere: SphereParams::unit(16, 0.5),
            background: Some("media/stars.jpg".into()),
        }
    }
}

pub struct SolarSystem {
    pub scene: Scene,
    pub sun: Sun,
    pub planets: Vec<OrbitingBody>,
    pub moon: OrbitingBody,
    pub satellites: Vec<SatelliteBody>,
    pub asteroids: Vec<OrbitingBody>,
    background: Option<TextureHandle>,
}

impl SolarSystem {
    /// Build every body and start all asset loads.
    pub fn build<R: Rng + ?Sized>(mut scene: Scene, settings: &SystemSettings, rng: &mut R) -> Self {
        let factory = BodyFactory::new(&mut scene, settings.sphere, settings.asteroid_sphere, rng);

        let sun = factory.make_sun(
            &mut scene,
            settings.sun_radius,
            Some(catalog::SUN_TEXTURE.into()),
            catalog::SUN_SPIN_SPEED,
        );

        let planets: Vec<OrbitingBody> = PLANETS
            .iter()
            .map(|spec| factory.make_planet(&mut scene, &spec.params()))
            .collect();

        let moon = factory.make_moon(&mut scene, &MOON.params(), planets[MOON_HOST].body);

        let satellites = SATELLITES
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let host = &planets[spec.host];
                let params = spec.params(format!("{}-satellite-{i}", host.name));
                factory.make_orbiting_model(&mut scene, &params, host.body)
            })
            .collect();

        let asteroids = (0..settings.asteroid_count)
            .map(|i| {
                let params = catalog::asteroid_params(i, rng);
                factory.make_asteroid(&mut scene, &params, rng)
            })
            .collect();

        let background = settings
            .background
            .as_ref()
            .map(|path| scene.request_texture(path.clone()));

        info!(
            "solar system built: {} planets, {} asteroids, {} satellites, {} nodes",
            PLANETS.len(),
            settings.asteroid_count,
            SATELLITES.len(),
            scene.graph.node_count()
        );

        Self {
            scene,
            sun,
            planets,
            moon,
            satellites,
            asteroids,
            background,
        }
    }

    /// Apply every asset load finished since the last call. Returns how many
    /// models were spliced into the graph.
    pub fn apply_asset_events(&mut self) -> usize {
        let models = self.scene.drain_assets();
        let mut attached = 0;
        for (handle, model) in models {
            let Some(satellite) = self.satellites.iter_mut().find(|s| s.model == handle) else {
                warn!("loaded model {handle:?} has no satellite waiting for it");
                continue;
            };
            let root = satellite.attach_model(&mut self.scene.graph, &mut self.scene.resources, model);
            debug!("attached model for {} at node {root:?}", satellite.name);
            attached += 1;
        }
        attached
    }

    /// Advance every body by `dt` seconds of wall time: the sun's own spin,
    /// planets, the moon, satellites, then asteroids.
    pub fn advance(&mut self, dt: f32, time_scale: f32) {
        let graph = &mut self.scene.graph;

        self.sun.advance(graph, dt);

        for planet in &mut self.planets {
            planet.advance(graph, dt, time_scale);
        }

        self.moon.advance(graph, dt, time_scale);
        graph.attach(self.moon.pivot, self.planets[MOON_HOST].body);

        for satellite in &mut self.satellites {
            satellite.advance(graph, dt, time_scale);
        }

        for asteroid in &mut self.asteroids {
            asteroid.advance(graph, dt, time_scale);
        }
    }

    pub fn sun_position(&self) -> Vec3 {
        self.scene.graph.world_position(self.sun.node)
    }

    pub fn sun_radius(&self) -> f32 {
        self.sun.radius()
    }

    pub fn planet(&self, name: &str) -> Option<&OrbitingBody> {
        self.planets.iter().find(|p| p.name == name)
    }

    pub fn background(&self) -> Option<TextureHandle> {
        self.background
    }

    pub fn resolved_satellites(&self) -> usize {
        self.satellites.iter().filter(|s| s.is_resolved()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::FakeSource;
    use crate::resources::TextureSlot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    fn small_settings() -> SystemSettings {
        SystemSettings {
            sphere: SphereParams::unit(8, 0.01),
            asteroid_count: 12,
            asteroid_sphere: SphereParams::unit(4, 0.5),
            ..SystemSettings::default()
        }
    }

    fn build() -> SolarSystem {
        let scene = Scene::inline(Arc::new(FakeSource));
        SolarSystem::build(scene, &small_settings(), &mut ChaCha8Rng::seed_from_u64(1))
    }

    #[test]
    fn test_catalog_is_fully_built() {
        let system = build();
        assert_eq!(system.planets.len(), 8);
        assert_eq!(system.asteroids.len(), 12);
        assert_eq!(system.satellites.len(), 3);
        // Shared sphere plus one mesh per asteroid.
        assert_eq!(system.scene.resources.meshes().len(), 13);
        assert!(system.planet("saturn").is_some());
        assert_eq!(system.sun_radius(), 4.0);
        assert_eq!(system.sun_position(), Vec3::ZERO);
    }

    #[test]
    fn test_missing_assets_degrade_silently() {
        let mut system = build();
        // FakeSource only serves paths containing "ok": every load fails.
        assert_eq!(system.apply_asset_events(), 0);
        assert_eq!(system.resolved_satellites(), 0);
        let background = system.background().unwrap();
        assert!(matches!(
            system.scene.resources.texture(background),
            Some(TextureSlot::Failed)
        ));

        let nodes = system.scene.graph.node_count();
        for _ in 0..10 {
            system.advance(DT, 1.0);
        }
        assert_eq!(system.scene.graph.node_count(), nodes);
        for sat in &system.satellites {
            assert!(system.scene.graph.children(sat.pivot).is_empty());
            assert_eq!(sat.orbit_angle(), 0.0);
        }
    }

    #[test]
    fn test_moon_reattach_leaves_structure_unchanged() {
        let mut system = build();
        let earth = system.planets[MOON_HOST].body;
        let nodes = system.scene.graph.node_count();
        let children = system.scene.graph.children(earth).to_vec();

        for _ in 0..100 {
            system.advance(DT, 1.0);
        }
        assert_eq!(system.scene.graph.node_count(), nodes);
        assert_eq!(system.scene.graph.children(earth), children.as_slice());
        assert_eq!(system.scene.graph.parent(system.moon.pivot), Some(earth));
    }

    #[test]
    fn test_moon_follows_earth() {
        let mut system = build();
        for _ in 0..240 {
            system.advance(DT, 1.0);
        }
        let graph = &system.scene.graph;
        let earth = graph.world_position(system.planets[MOON_HOST].body);
        let moon = graph.world_position(system.moon.body);
        assert!(((moon - earth).length() - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_negative_time_scale_reverses_orbits() {
        let mut forward = build();
        let mut backward = build();
        for _ in 0..50 {
            forward.advance(DT, 1.0);
            backward.advance(DT, -1.0);
        }
        for (f, b) in forward.planets.iter().zip(&backward.planets) {
            assert!(f.orbit_angle() > 0.0);
            assert!((f.orbit_angle() + b.orbit_angle()).abs() < 1e-5, "{}", f.name);
            assert!((f.spin_angle() + b.spin_angle()).abs() < 1e-5, "{}", f.name);
        }
    }

    #[test]
    fn test_sun_spins_even_when_time_is_frozen() {
        let mut system = build();
        system.advance(1.0, 0.0);
        assert!((system.sun.spin_angle() - catalog::SUN_SPIN_SPEED).abs() < 1e-6);
        assert!(system.planets.iter().all(|p| p.orbit_angle() == 0.0));
    }

    #[test]
    fn test_asteroids_stay_in_belt() {
        let mut system = build();
        for _ in 0..100 {
            system.advance(DT, 5.0);
        }
        for asteroid in &system.asteroids {
            let p = system.scene.graph.world_position(asteroid.body);
            let planar = glam::Vec2::new(p.x, p.z).length();
            assert!((31.0 - 1e-3..=35.0 + 1e-3).contains(&planar), "{planar}");
            assert!(p.y.abs() <= 0.5 + 1e-4);
            let r = system.scene.graph.transform(asteroid.body).rotation;
            assert_eq!(r.x, r.y, "asteroids tumble on two axes");
        }
    }

    #[test]
    fn test_loaded_satellites_follow_their_hosts() {
        use crate::assets::{AssetError, AssetSource};
        use crate::assets::tests::triangle_model;
        use crate::model::ModelData;
        use crate::resources::TextureData;
        use std::path::Path;

        struct AllOk;
        impl AssetSource for AllOk {
            fn load_texture(&self, _: &Path) -> Result<TextureData, AssetError> {
                Ok(TextureData::solid(1, 1, [255; 4]))
            }
            fn load_model(&self, _: &Path) -> Result<ModelData, AssetError> {
                Ok(triangle_model())
            }
        }

        let scene = Scene::inline(Arc::new(AllOk));
        let mut system =
            SolarSystem::build(scene, &small_settings(), &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(system.apply_asset_events(), 3);
        assert_eq!(system.resolved_satellites(), 3);
        assert_eq!(system.scene.resources.pending_textures(), 0);

        for _ in 0..30 {
            system.advance(DT, 1.0);
        }
        let graph = &system.scene.graph;
        for sat in &system.satellites {
            assert_eq!(
                graph.transform(sat.pivot).translation,
                graph.world_position(sat.parent_body)
            );
        }
    }
}
