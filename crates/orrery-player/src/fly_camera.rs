//! Damped first-person flight.
//!
//! Horizontal motion is velocity-based: held keys accelerate, and the
//! velocity decays exponentially every frame so the camera coasts to a stop.
//! Vertical motion is a direct, undamped translation.

use glam::{Vec2, Vec3};
use orrery_input::InputState;

use crate::pointer_lock::PointerLockControls;

/// Largest fraction of the velocity one frame's damping may remove. Keeps a
/// long frame from flipping the velocity's sign or stopping it dead.
const MAX_DAMPING_STEP: f32 = 0.9;

/// Push direction used when the camera sits exactly on the clamp center.
const FALLBACK_PUSH_AXIS: Vec3 = Vec3::Y;

/// Movement tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementSettings {
    /// Horizontal acceleration while a move key is held (units/s²).
    pub move_speed: f32,
    /// Vertical speed while Space/Shift is held (units/s).
    pub vertical_speed: f32,
    /// Velocity decay rate (1/s).
    pub damping: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            move_speed: 100.0,
            vertical_speed: 10.0,
            damping: 10.0,
        }
    }
}

/// Camera position, damped velocity and look controls.
///
/// `velocity.x` runs along the camera's right axis and `velocity.z` along
/// its backward axis, both in the horizontal facing plane. `velocity.y` is
/// unused: vertical movement is never damped.
#[derive(Clone, Debug)]
pub struct FlyCamera {
    pub position: Vec3,
    pub velocity: Vec3,
    pub controls: PointerLockControls,
}

impl FlyCamera {
    /// A camera at `position` facing `target`.
    pub fn looking_at(position: Vec3, target: Vec3, mut controls: PointerLockControls) -> Self {
        controls.look_at(position, target);
        Self {
            position,
            velocity: Vec3::ZERO,
            controls,
        }
    }

    /// Advance one frame of movement: damping, acceleration from intents,
    /// vertical translation, then translation by the velocity.
    pub fn step(&mut self, dt: f32, input: &InputState, settings: &MovementSettings) {
        let decay = (settings.damping * dt).min(MAX_DAMPING_STEP);
        self.velocity.x -= self.velocity.x * decay;
        self.velocity.z -= self.velocity.z * decay;

        let direction = Vec2::new(
            axis(input.right, input.left),
            axis(input.forward, input.backward),
        )
        .normalize_or_zero();

        if input.forward || input.backward {
            self.velocity.z -= direction.y * settings.move_speed * dt;
        }
        if input.left || input.right {
            self.velocity.x -= direction.x * settings.move_speed * dt;
        }

        if input.up {
            self.position.y += settings.vertical_speed * dt;
        }
        if input.down {
            self.position.y -= settings.vertical_speed * dt;
        }

        self.controls
            .move_right(&mut self.position, -self.velocity.x * dt);
        self.controls
            .move_forward(&mut self.position, -self.velocity.z * dt);
    }

    /// Keep the camera at least `min_distance` from `center`.
    ///
    /// A camera inside the sphere is moved radially outward onto its surface.
    /// Returns whether the camera was moved.
    pub fn clamp_outside(&mut self, center: Vec3, min_distance: f32) -> bool {
        let offset = self.position - center;
        if offset.length() >= min_distance {
            return false;
        }
        let push = offset.try_normalize().unwrap_or(FALLBACK_PUSH_AXIS);
        self.position = center + push * min_distance;
        true
    }

    /// Horizontal speed in units per second.
    pub fn speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}
