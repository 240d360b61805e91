//! The solar-system scene: transform hierarchy, bodies, materials and
//! asynchronously loaded assets.
//!
//! Everything here runs on the frame thread. Background asset loads only
//! communicate through the completion queue drained by
//! [`SolarSystem::apply_asset_events`].

pub mod assets;
pub mod body;
pub mod catalog;
pub mod factory;
pub mod graph;
pub mod material;
pub mod model;
pub mod resources;
pub mod scene;
pub mod solar_system;

pub use assets::{AssetError, AssetEvent, AssetLoader, AssetRequest, AssetSource, FsAssetSource};
pub use body::{OrbitingBody, SatelliteBody, SpinAxes, Sun};
pub use factory::{BodyFactory, BodyParams, SatelliteParams};
pub use graph::{NodeId, SceneGraph, Transform, Visual};
pub use material::{Color, Material};
pub use model::{ModelData, ModelPrimitive};
pub use resources::{MeshHandle, ModelHandle, SceneResources, TextureData, TextureHandle, TextureSlot};
pub use scene::Scene;
pub use solar_system::{SolarSystem, SystemSettings};
