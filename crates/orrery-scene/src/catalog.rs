//! The bodies of the orrery. Speeds are radians per second at time scale 1.

use std::f32::consts::TAU;

use rand::Rng;

use crate::factory::{BodyParams, SatelliteParams};
use crate::material::Color;

/// Static description of a planet or moon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetSpec {
    pub name: &'static str,
    pub radius: f32,
    pub distance: f32,
    pub orbital_speed: f32,
    pub spin_speed: f32,
    pub texture: &'static str,
    pub color: Option<Color>,
}

impl PlanetSpec {
    pub fn params(&self) -> BodyParams {
        let mut params =
            BodyParams::new(self.name, self.radius, self.distance).speeds(self.orbital_speed, self.spin_speed);
        params.texture = Some(self.texture.into());
        params.color = self.color;
        params
    }
}

const fn planet(
    name: &'static str,
    radius: f32,
    distance: f32,
    orbital_speed: f32,
    spin_speed: f32,
    texture: &'static str,
    color: Option<Color>,
) -> PlanetSpec {
    PlanetSpec {
        name,
        radius,
        distance,
        orbital_speed,
        spin_speed,
        texture,
        color,
    }
}

pub const PLANETS: [PlanetSpec; 8] = [
    planet("mercury", 0.38, 13.0, 0.24, 1.2, "media/mercury.jpg", Some(Color::from_hex(0xaaaaaa))),
    planet("venus", 0.95, 16.0, 0.21, 0.6, "media/venus.jpg", None),
    planet("earth", 1.0, 23.0, 0.18, 1.2, "media/earth.jpg", None),
    planet("mars", 0.53, 29.0, 0.15, 1.2, "media/mars.jpg", Some(Color::from_hex(0xff0000))),
    planet("jupiter", 2.5, 37.0, 0.09, 0.6, "media/jupiter.jpg", None),
    planet("saturn", 2.0, 51.0, 0.072, 0.6, "media/saturn.jpg", None),
    planet("uranus", 1.5, 62.0, 0.048, 0.6, "media/uranus.jpg", None),
    planet("neptune", 1.4, 74.0, 0.042, 0.6, "media/neptune.jpg", None),
];

pub const MOON: PlanetSpec = planet("moon", 0.3, 2.5, 0.9, 0.6, "media/moon.jpg", Some(Color::WHITE));

/// Index into [`PLANETS`] of the body the moon circles.
pub const MOON_HOST: usize = 2;

pub const SUN_TEXTURE: &str = "media/sun.jpg";
pub const SUN_SPIN_SPEED: f32 = 0.12;

pub const SATELLITE_MODEL: &str = "models/sat.obj";

/// A satellite around `PLANETS[host]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SatelliteSpec {
    pub host: usize,
    pub distance: f32,
    pub scale: f32,
    pub orbital_speed: f32,
    pub spin_speed: f32,
    pub height_offset: f32,
}

impl SatelliteSpec {
    pub fn params(&self, name: String) -> SatelliteParams {
        SatelliteParams {
            name,
            model: SATELLITE_MODEL.into(),
            distance: self.distance,
            scale: self.scale,
            orbital_speed: self.orbital_speed,
            spin_speed: self.spin_speed,
            height_offset: self.height_offset,
        }
    }
}

pub const SATELLITES: [SatelliteSpec; 3] = [
    SatelliteSpec {
        host: 3,
        distance: 2.0,
        scale: 0.03,
        orbital_speed: 0.6,
        spin_speed: 0.0,
        height_offset: 0.3,
    },
    SatelliteSpec {
        host: 2,
        distance: 2.0,
        scale: 0.03,
        orbital_speed: 0.6,
        spin_speed: 0.0,
        height_offset: 0.3,
    },
    SatelliteSpec {
        host: 0,
        distance: 30.0,
        scale: 0.1,
        orbital_speed: 0.12,
        spin_speed: 1.2,
        height_offset: 0.0,
    },
];

/// The belt between Mars and Jupiter.
pub mod belt {
    pub const DISTANCE: (f32, f32) = (31.0, 35.0);
    pub const RADIUS: (f32, f32) = (0.05, 0.2);
    pub const HEIGHT: (f32, f32) = (-0.5, 0.5);
    pub const ORBITAL_SPEED: (f32, f32) = (0.05, 0.15);
    pub const SPIN_SPEED: (f32, f32) = (0.3, 1.5);
    pub const COLOR: crate::material::Color = crate::material::Color::from_hex(0x888888);
}

/// Draw the parameters of asteroid number `index`.
pub fn asteroid_params<R: Rng + ?Sized>(index: usize, rng: &mut R) -> BodyParams {
    let mut range = |(lo, hi): (f32, f32)| rng.random_range(lo..=hi);
    let distance = range(belt::DISTANCE);
    let radius = range(belt::RADIUS);
    let height_offset = range(belt::HEIGHT);
    let orbital_speed = range(belt::ORBITAL_SPEED);
    let spin_speed = range(belt::SPIN_SPEED);

    let mut params = BodyParams::new(format!("asteroid-{index}"), radius, distance)
        .speeds(orbital_speed, spin_speed);
    params.height_offset = height_offset;
    params.initial_orbit_angle = rng.random_range(0.0..TAU);
    params.color = Some(belt::COLOR);
    params
}
