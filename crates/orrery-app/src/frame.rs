//! The per-frame simulation step, independent of any window or GPU.

use glam::Vec3;
use orrery_config::Config;
use orrery_input::{FrameInput, PointerCommand, TimeScaleCommand};
use orrery_mesh::SphereParams;
use orrery_player::{FlyCamera, MovementSettings, PointerLockControls};
use orrery_render::{Camera, FrameView};
use orrery_scene::{SolarSystem, SystemSettings};
use tracing::{debug, info, warn};

use crate::hud::{HudState, update_hud};

/// Global simulation speed multiplier.
///
/// Unbounded in both directions: a negative value runs every orbit and spin
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    value: f32,
    step: f32,
}

impl TimeScale {
    pub fn new(initial: f32, step: f32) -> Self {
        Self {
            value: initial,
            step,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn increase(&mut self) {
        self.value += self.step;
    }

    pub fn decrease(&mut self) {
        self.value -= self.step;
    }

    pub fn reset(&mut self) {
        self.value = 1.0;
    }

    pub fn apply(&mut self, command: TimeScaleCommand) {
        match command {
            TimeScaleCommand::Increase => self.increase(),
            TimeScaleCommand::Decrease => self.decrease(),
            TimeScaleCommand::Reset => self.reset(),
        }
        info!("time scale {:.1}x", self.value);
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

/// Projection and lighting constants handed to the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub ambient: f32,
    pub sun_emission: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            ambient: 0.1,
            sun_emission: 1.3,
        }
    }
}

/// Tuning for [`Orrery`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrrerySettings {
    pub movement: MovementSettings,
    /// Extra clearance kept between the camera and the sun's surface.
    pub collision_radius: f32,
    pub view: ViewSettings,
}

impl Default for OrrerySettings {
    fn default() -> Self {
        Self {
            movement: MovementSettings::default(),
            collision_radius: 3.0,
            view: ViewSettings::default(),
        }
    }
}

impl OrrerySettings {
    pub fn from_config(config: &Config) -> Self {
        let camera = &config.camera;
        let render = &config.render;
        Self {
            movement: MovementSettings {
                move_speed: camera.move_speed,
                vertical_speed: camera.vertical_speed,
                damping: camera.damping,
            },
            collision_radius: camera.collision_radius,
            view: ViewSettings {
                fov_y_degrees: render.fov_y_degrees,
                near: render.near,
                far: render.far,
                ambient: render.ambient,
                sun_emission: render.sun_emission,
            },
        }
    }
}

/// Scene construction settings from the config file. Segment counts below
/// one are raised to one.
pub fn system_settings(config: &Config) -> SystemSettings {
    let scene = &config.scene;
    let background = &config.render.background;
    let sphere_segments = at_least_one_segment("sphere_segments", scene.sphere_segments);
    let asteroid_segments = at_least_one_segment("asteroid_segments", scene.asteroid_segments);
    SystemSettings {
        sun_radius: scene.sun_radius,
        sphere: SphereParams::unit(sphere_segments, scene.displacement),
        asteroid_count: scene.asteroid_count as usize,
        asteroid_sphere: SphereParams::unit(asteroid_segments, scene.asteroid_displacement),
        background: (!background.is_empty()).then(|| background.into()),
    }
}

fn at_least_one_segment(key: &str, value: u32) -> u32 {
    if value == 0 {
        warn!("scene.{key} is 0, using 1");
        1
    } else {
        value
    }
}

/// The starting camera pose from the config file.
pub fn initial_camera(config: &Config) -> FlyCamera {
    let controls = PointerLockControls::new(config.input.mouse_sensitivity, config.input.invert_y);
    FlyCamera::looking_at(
        Vec3::from_array(config.camera.start_position),
        Vec3::from_array(config.camera.look_at),
        controls,
    )
}

/// The whole simulation: bodies, camera, time scale and telemetry.
pub struct Orrery {
    pub system: SolarSystem,
    pub camera: FlyCamera,
    pub time_scale: TimeScale,
    settings: OrrerySettings,
    hud: HudState,
}

impl Orrery {
    pub fn new(
        system: SolarSystem,
        camera: FlyCamera,
        time_scale: TimeScale,
        settings: OrrerySettings,
    ) -> Self {
        let mut hud = HudState::default();
        update_hud(&mut hud, camera.position, time_scale.value(), 0.0);
        Self {
            system,
            camera,
            time_scale,
            settings,
            hud,
        }
    }

    pub fn from_config(system: SolarSystem, config: &Config) -> Self {
        Self::new(
            system,
            initial_camera(config),
            TimeScale::new(config.scene.time_scale, config.scene.time_scale_step),
            OrrerySettings::from_config(config),
        )
    }

    /// Advance one frame of `dt` seconds.
    ///
    /// Finished asset loads are spliced in first, then the input is applied,
    /// the camera moves and is kept clear of the sun, every body advances and
    /// the telemetry is refreshed.
    pub fn step(&mut self, dt: f32, input: &FrameInput) {
        self.system.apply_asset_events();

        for command in &input.time_scale {
            self.time_scale.apply(*command);
        }

        let controls = &mut self.camera.controls;
        match input.pointer {
            Some(PointerCommand::Lock) => controls.lock(),
            Some(PointerCommand::Release) => controls.unlock(),
            None => {}
        }
        controls.look(input.look);

        self.camera.step(dt, &input.movement, &self.settings.movement);

        let min_distance = self.system.sun_radius() + self.settings.collision_radius;
        if self
            .camera
            .clamp_outside(self.system.sun_position(), min_distance)
        {
            debug!("camera pushed out of the sun to {:?}", self.camera.position);
        }

        let time_scale = self.time_scale.value();
        self.system.advance(dt, time_scale);

        update_hud(&mut self.hud, self.camera.position, time_scale, dt);
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn settings(&self) -> &OrrerySettings {
        &self.settings
    }

    /// What the renderer needs for this frame, for a viewport of the given
    /// aspect ratio.
    pub fn frame_view(&self, aspect_ratio: f32) -> FrameView {
        let view = &self.settings.view;
        FrameView {
            camera: Camera {
                position: self.camera.position,
                rotation: self.camera.controls.rotation(),
                fov_y: view.fov_y_degrees.to_radians(),
                aspect_ratio,
                near: view.near,
                far: view.far,
            },
            sun_position: self.system.sun_position(),
            ambient: view.ambient,
            emission: view.sun_emission,
            background: self.system.background(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_input::InputState;
    use orrery_scene::{BodyFactory, BodyParams, FsAssetSource, Scene};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-4;

    /// An orrery whose assets all fail to load, so nothing waits on the disk.
    fn orrery(dir: &tempfile::TempDir) -> Orrery {
        let scene = Scene::inline(Arc::new(FsAssetSource::new(dir.path())));
        let settings = SystemSettings {
            sphere: SphereParams::unit(8, 0.01),
            asteroid_count: 10,
            asteroid_sphere: SphereParams::unit(4, 0.5),
            ..SystemSettings::default()
        };
        let system = SolarSystem::build(scene, &settings, &mut ChaCha8Rng::seed_from_u64(7));
        Orrery::from_config(system, &Config::default())
    }

    fn time_scale_input(commands: &[TimeScaleCommand]) -> FrameInput {
        FrameInput {
            time_scale: commands.to_vec(),
            ..FrameInput::default()
        }
    }

    #[test]
    fn test_time_scale_steps_and_resets() {
        let mut scale = TimeScale::default();
        for _ in 0..3 {
            scale.increase();
        }
        assert!((scale.value() - 1.3).abs() < EPS);
        for _ in 0..23 {
            scale.decrease();
        }
        assert!((scale.value() + 1.0).abs() < EPS, "no floor: {}", scale.value());
        scale.apply(TimeScaleCommand::Reset);
        assert_eq!(scale.value(), 1.0);
    }

    #[test]
    fn test_planet_angles_after_hundred_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let factory = BodyFactory::new(
            &mut orrery.system.scene,
            SphereParams::unit(4, 0.01),
            SphereParams::unit(4, 0.5),
            &mut rng,
        );
        let params = BodyParams::new("probe", 1.0, 20.0).speeds(0.003, 0.02);
        let planet = factory.make_planet(&mut orrery.system.scene, &params);
        orrery.system.planets.push(planet);

        let input = FrameInput::default();
        for _ in 0..100 {
            orrery.step(DT, &input);
        }

        let probe = orrery.system.planet("probe").unwrap();
        let elapsed = 100.0 * DT;
        assert!((probe.orbit_angle() - elapsed * 0.003).abs() < 1e-6);
        assert!((probe.spin_angle() - elapsed * 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_time_mirrors_orbit() {
        let dir = tempfile::tempdir().unwrap();
        let mut forward = orrery(&dir);
        let mut backward = orrery(&dir);
        backward.time_scale = TimeScale::new(-1.0, 0.1);

        let start: Vec<f32> = forward.system.planets.iter().map(|p| p.orbit_angle()).collect();
        for _ in 0..30 {
            forward.step(DT, &FrameInput::default());
            backward.step(DT, &FrameInput::default());
        }

        for (i, (f, b)) in forward
            .system
            .planets
            .iter()
            .zip(&backward.system.planets)
            .enumerate()
        {
            let gained = f.orbit_angle() - start[i];
            let lost = start[i] - b.orbit_angle();
            assert!(gained > 0.0);
            assert!((gained - lost).abs() < EPS, "{}: {gained} vs {lost}", f.name);
        }
    }

    #[test]
    fn test_time_scale_keys_take_effect_same_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        orrery.step(DT, &time_scale_input(&[TimeScaleCommand::Increase]));
        assert!((orrery.time_scale.value() - 1.1).abs() < EPS);
        assert!((orrery.hud().time_scale - 1.1).abs() < EPS);

        orrery.step(
            DT,
            &time_scale_input(&[TimeScaleCommand::Increase, TimeScaleCommand::Reset]),
        );
        assert_eq!(orrery.time_scale.value(), 1.0);

        orrery.step(
            DT,
            &time_scale_input(&[TimeScaleCommand::Reset, TimeScaleCommand::Increase]),
        );
        assert!((orrery.time_scale.value() - 1.1).abs() < EPS);
    }

    #[test]
    fn test_reset_then_increase_from_keys() {
        use orrery_input::{
            ActionResolver, ActionState, InputMap, KeyboardState, MouseState, RawKeyEvent,
        };
        use winit::event::ElementState;
        use winit::keyboard::KeyCode;

        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        orrery.time_scale = TimeScale::new(3.0, 0.1);

        let mut keyboard = KeyboardState::new();
        for key in [KeyCode::Digit0, KeyCode::BracketRight] {
            keyboard.process_raw(RawKeyEvent {
                key,
                state: ElementState::Pressed,
                repeat: false,
            });
        }
        let mouse = MouseState::new();
        let mut actions = ActionState::new();
        ActionResolver::resolve(&InputMap::default(), &keyboard, &mouse, &mut actions);

        orrery.step(DT, &FrameInput::collect(&actions, &mouse));
        assert!((orrery.time_scale.value() - 1.1).abs() < EPS);
    }

    #[test]
    fn test_camera_in_sun_is_pushed_to_surface() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        orrery.time_scale = TimeScale::new(0.0, 0.1);
        orrery.camera.position = orrery.system.sun_position();

        orrery.step(DT, &FrameInput::default());

        let expected = orrery.system.sun_radius() + orrery.settings().collision_radius;
        let distance = orrery.camera.position.distance(orrery.system.sun_position());
        assert!((distance - expected).abs() < EPS, "{distance} != {expected}");
    }

    #[test]
    fn test_camera_near_sun_keeps_direction() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        orrery.camera.position = Vec3::new(2.0, 0.0, 1.0);
        let before = orrery.camera.position.normalize();

        orrery.step(DT, &FrameInput::default());

        let after = orrery.camera.position;
        assert!((after.length() - 7.0).abs() < EPS);
        assert!((after.normalize() - before).length() < EPS);
    }

    #[test]
    fn test_camera_coasts_to_a_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        let forward = FrameInput::moving(InputState {
            forward: true,
            ..InputState::default()
        });
        for _ in 0..20 {
            orrery.step(DT, &forward);
        }

        let mut previous = orrery.camera.speed();
        for _ in 0..60 {
            orrery.step(DT, &FrameInput::default());
            let speed = orrery.camera.speed();
            assert!(speed < previous && speed > 0.0);
            previous = speed;
        }
    }

    #[test]
    fn test_moon_structure_stable_across_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        orrery.step(DT, &FrameInput::default());

        let earth = orrery.system.planet("earth").unwrap().body;
        let nodes = orrery.system.scene.graph.node_count();
        let children = orrery.system.scene.graph.children(earth).to_vec();

        for _ in 0..50 {
            orrery.step(DT, &FrameInput::default());
        }
        assert_eq!(orrery.system.scene.graph.node_count(), nodes);
        assert_eq!(orrery.system.scene.graph.children(earth), children.as_slice());
        assert_eq!(
            orrery.system.scene.graph.parent(orrery.system.moon.pivot),
            Some(earth)
        );
    }

    #[test]
    fn test_look_only_after_lock() {
        let dir = tempfile::tempdir().unwrap();
        let mut orrery = orrery(&dir);
        let yaw = orrery.camera.controls.yaw;

        let look = FrameInput {
            look: glam::Vec2::new(50.0, 0.0),
            ..FrameInput::default()
        };
        orrery.step(DT, &look);
        assert_eq!(orrery.camera.controls.yaw, yaw);

        orrery.step(
            DT,
            &FrameInput {
                pointer: Some(PointerCommand::Lock),
                ..look.clone()
            },
        );
        assert!(orrery.camera.controls.is_locked());
        assert!(orrery.camera.controls.yaw < yaw);

        orrery.step(
            DT,
            &FrameInput {
                pointer: Some(PointerCommand::Release),
                ..FrameInput::default()
            },
        );
        assert!(!orrery.camera.controls.is_locked());
    }

    #[test]
    fn test_frame_view_follows_camera() {
        let dir = tempfile::tempdir().unwrap();
        let orrery = orrery(&dir);
        let view = orrery.frame_view(2.0);
        assert_eq!(view.camera.position, Vec3::new(0.0, 50.0, 100.0));
        assert_eq!(view.camera.aspect_ratio, 2.0);
        assert!((view.camera.fov_y - 60f32.to_radians()).abs() < EPS);
        let expected = Vec3::new(0.0, -50.0, -100.0).normalize();
        assert!((view.camera.forward() - expected).length() < EPS);
        assert_eq!(view.background, orrery.system.background());
    }

    #[test]
    fn test_config_drives_settings() {
        let mut config = Config::default();
        config.scene.asteroid_count = 5;
        config.render.background = String::new();
        config.camera.collision_radius = 1.5;

        let system = system_settings(&config);
        assert_eq!(system.asteroid_count, 5);
        assert_eq!(system.background, None);
        assert_eq!(system.sphere.width_segments, 100);

        let settings = OrrerySettings::from_config(&config);
        assert_eq!(settings.collision_radius, 1.5);
        assert_eq!(settings.movement, MovementSettings::default());
    }

    #[test]
    fn test_zero_segments_from_config_still_build() {
        let mut config = Config::default();
        config.scene.sphere_segments = 0;
        config.scene.asteroid_segments = 0;
        config.scene.asteroid_count = 2;
        let settings = system_settings(&config);
        assert_eq!(settings.sphere.width_segments, 1);
        assert_eq!(settings.sphere.height_segments, 1);
        assert_eq!(settings.asteroid_sphere.width_segments, 1);

        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::inline(Arc::new(FsAssetSource::new(dir.path())));
        let system = SolarSystem::build(scene, &settings, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(system.asteroids.len(), 2);
    }
}
