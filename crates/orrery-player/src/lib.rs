//! The first-person fly camera: pointer-lock look and damped movement.

pub mod fly_camera;
pub mod pointer_lock;

pub use fly_camera::{FlyCamera, MovementSettings};
pub use pointer_lock::{BASE_LOOK_SENSITIVITY, PITCH_LIMIT, PointerLockControls};
