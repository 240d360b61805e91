//! The orrery application: the per-frame simulation step, the frame clock,
//! telemetry and the winit host that ties them to a window.

pub mod frame;
pub mod frame_clock;
pub mod hud;
pub mod platform;
pub mod window;

pub use frame::{Orrery, OrrerySettings, TimeScale, ViewSettings, initial_camera, system_settings};
pub use frame_clock::{FrameClock, MAX_FRAME_TIME};
pub use hud::{HudState, format_hud, hud_lines};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{OrreryApp, RunError, run};
