//! Frame-coherent keyboard state.
//!
//! Physical key codes are used so WASD sits under the same fingers on every
//! layout. Keys winit cannot identify are dropped.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, constructible without a window.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: KeyCode,
    pub state: ElementState,
    /// OS auto-repeat of a held key.
    pub repeat: bool,
}

/// Held keys plus the press/release edges seen since the last
/// [`end_frame`](Self::end_frame).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
    /// Press edges in arrival order, one entry per press.
    presses: Vec<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit key event.
    pub fn process_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(key) = event.physical_key {
            self.process_raw(RawKeyEvent {
                key,
                state: event.state,
                repeat: event.repeat,
            });
        }
    }

    /// Feed a key event. Auto-repeat presses are ignored so one physical
    /// press produces exactly one edge.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        match event.state {
            ElementState::Pressed if event.repeat => {}
            ElementState::Pressed => {
                self.held.insert(event.key);
                self.pressed_this_frame.insert(event.key);
                self.presses.push(event.key);
            }
            ElementState::Released => {
                if self.held.remove(&event.key) {
                    self.released_this_frame.insert(event.key);
                }
            }
        }
    }

    /// Release every held key, e.g. when the window loses focus and the
    /// matching release events will never arrive.
    pub fn release_all(&mut self) {
        self.released_this_frame.extend(self.held.drain());
    }

    #[must_use]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Pressed at least once since the last frame boundary, even if already
    /// released again.
    #[must_use]
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    #[must_use]
    pub fn was_released(&self, key: KeyCode) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Keys pressed since the last frame boundary, oldest first. A key
    /// tapped twice appears twice.
    #[must_use]
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Drop this frame's edges. Call after the simulation consumed them.
    pub fn end_frame(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
        self.presses.clear();
    }
}
