//! Mesh data and procedural sphere generation for celestial bodies.

pub mod mesh;
pub mod sphere;

pub use mesh::{Mesh, MeshError, MeshVertex};
pub use sphere::{
    DisplacementGrid, SphereParams, build_sphere, generate_displaced_sphere,
    generate_displaced_sphere_with, sphere_indices,
};
