//! wgpu renderer for the orrery scene graph.
//!
//! One shared body pipeline draws every visual; a flag in the per-object
//! uniform picks the texture or the flat color, another marks emissive
//! surfaces. An equirectangular sky is drawn behind everything.

pub mod background;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pipeline;
pub mod renderer;
pub mod texture;

pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pipeline::{FrameUniform, ObjectUniform};
pub use renderer::{FrameView, SceneRenderer};
