//! Mouse buttons, raw motion, and pointer capture.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};
use winit::window::{CursorGrabMode, Window};

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    held: bool,
    pressed_this_frame: bool,
}

fn button_slot(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Accumulated mouse input for one frame.
///
/// Look motion comes from raw `DeviceEvent::MouseMotion` deltas and is only
/// collected while the pointer is captured, so moving the free cursor over
/// the window never turns the camera.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    motion: Vec2,
    buttons: [ButtonState; 3],
    captured: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a raw motion delta in device units.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.motion += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a `MouseInput` event.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(slot) = button_slot(button) else {
            return;
        };
        let b = &mut self.buttons[slot];
        match state {
            ElementState::Pressed => {
                b.held = true;
                b.pressed_this_frame = true;
            }
            ElementState::Released => b.held = false,
        }
    }

    /// Grab or release the pointer on `window`.
    ///
    /// Tries `Locked` first and falls back to `Confined` on platforms that
    /// cannot lock. The cursor is hidden while captured.
    pub fn set_captured(&mut self, window: &Window, captured: bool) {
        if captured {
            if let Err(locked_err) = window.set_cursor_grab(CursorGrabMode::Locked)
                && let Err(confined_err) = window.set_cursor_grab(CursorGrabMode::Confined)
            {
                tracing::warn!("Pointer capture unavailable: {locked_err}; {confined_err}");
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::debug!("Pointer release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
        self.set_captured_flag(captured);
    }

    /// Update the capture flag without touching a window.
    pub fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
        if !captured {
            self.motion = Vec2::ZERO;
        }
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Motion accumulated since the last frame boundary.
    #[must_use]
    pub fn motion(&self) -> Vec2 {
        self.motion
    }

    #[must_use]
    pub fn is_held(&self, button: MouseButton) -> bool {
        button_slot(button).is_some_and(|i| self.buttons[i].held)
    }

    #[must_use]
    pub fn was_pressed(&self, button: MouseButton) -> bool {
        button_slot(button).is_some_and(|i| self.buttons[i].pressed_this_frame)
    }

    /// Drop this frame's motion and press edges.
    pub fn end_frame(&mut self) {
        self.motion = Vec2::ZERO;
        for b in &mut self.buttons {
            b.pressed_this_frame = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_ignored_until_captured() {
        let mut ms = MouseState::new();
        ms.on_raw_motion(10.0, 5.0);
        assert_eq!(ms.motion(), Vec2::ZERO);

        ms.set_captured_flag(true);
        ms.on_raw_motion(10.0, 5.0);
        ms.on_raw_motion(-4.0, 1.0);
        assert_eq!(ms.motion(), Vec2::new(6.0, 6.0));
    }

    #[test]
    fn test_release_capture_drops_pending_motion() {
        let mut ms = MouseState::new();
        ms.set_captured_flag(true);
        ms.on_raw_motion(3.0, 3.0);
        ms.set_captured_flag(false);
        assert_eq!(ms.motion(), Vec2::ZERO);
        assert!(!ms.is_captured());
    }

    #[test]
    fn test_button_press_edge_lasts_one_frame() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(ms.is_held(MouseButton::Left));
        assert!(ms.was_pressed(MouseButton::Left));

        ms.end_frame();
        assert!(ms.is_held(MouseButton::Left));
        assert!(!ms.was_pressed(MouseButton::Left));

        ms.on_button(MouseButton::Left, ElementState::Released);
        assert!(!ms.is_held(MouseButton::Left));
    }

    #[test]
    fn test_untracked_buttons_are_ignored() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Back, ElementState::Pressed);
        assert!(!ms.is_held(MouseButton::Back));
        assert!(!ms.was_pressed(MouseButton::Back));
    }

    #[test]
    fn test_end_frame_resets_motion() {
        let mut ms = MouseState::new();
        ms.set_captured_flag(true);
        ms.on_raw_motion(1.0, 1.0);
        ms.end_frame();
        assert_eq!(ms.motion(), Vec2::ZERO);
        assert!(ms.is_captured(), "capture survives frame boundaries");
    }
}
