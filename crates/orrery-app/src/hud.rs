//! On-screen telemetry: camera position, time scale and the controls.
//!
//! [`hud_lines`] gives the full multi-line panel; [`format_hud`] flattens it
//! onto the single line shown in the window title.

use glam::Vec3;

/// Static control help appended below the telemetry.
pub const CONTROLS: [&str; 6] = [
    "Click to lock the mouse, Escape to release it.",
    "Move the mouse to look around.",
    "W, A, S, D to move.",
    "Space to rise.",
    "Shift to sink.",
    "[, ] and 0 to set the speed.",
];

/// Telemetry values refreshed once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub camera_position: Vec3,
    pub time_scale: f32,
    /// Frames per second (smoothed).
    pub fps: f32,
    /// Exponential moving average of frame time.
    frame_time_ema: f32,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            camera_position: Vec3::ZERO,
            time_scale: 1.0,
            fps: 0.0,
            frame_time_ema: 1.0 / 60.0,
        }
    }
}

/// Refresh the telemetry after a frame of `dt` seconds.
pub fn update_hud(hud: &mut HudState, camera_position: Vec3, time_scale: f32, dt: f32) {
    hud.camera_position = camera_position;
    hud.time_scale = time_scale;

    if dt > 0.0 {
        // EMA with α = 0.1 for smooth display
        hud.frame_time_ema = hud.frame_time_ema * 0.9 + dt * 0.1;
        hud.fps = 1.0 / hud.frame_time_ema;
    }
}

/// Telemetry lines followed by a blank line and the control help.
pub fn hud_lines(hud: &HudState) -> Vec<String> {
    let p = hud.camera_position;
    let mut lines = vec![
        format!("Camera X: {:.2}", p.x),
        format!("Camera Y: {:.2}", p.y),
        format!("Camera Z: {:.2}", p.z),
        String::new(),
        format!("Speed: {:.1}x", hud.time_scale),
        format!("FPS: {:.0}", hud.fps),
        String::new(),
    ];
    lines.extend(CONTROLS.iter().map(|line| (*line).to_string()));
    lines
}

/// Every non-blank line of [`hud_lines`], joined with ` | `.
///
/// Example: `Camera X: 0.00 | Camera Y: 50.00 | Camera Z: 100.00 | Speed: 1.0x | FPS: 60 | Click to lock ...`
pub fn format_hud(hud: &HudState) -> String {
    hud_lines(hud)
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
