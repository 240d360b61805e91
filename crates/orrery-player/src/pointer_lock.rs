//! Mouse-look controller in the style of browser pointer-lock controls.
//!
//! Orientation is yaw about world Y followed by pitch about the local X axis,
//! so the camera never rolls and its right vector stays horizontal.

use glam::{Quat, Vec2, Vec3};

/// Radians of rotation per device unit of mouse motion at multiplier 1.0.
pub const BASE_LOOK_SENSITIVITY: f32 = 0.002;

/// Pitch is clamped to ±89° to keep the view from flipping over the pole.
pub const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Yaw/pitch orientation that only responds to the mouse while locked.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerLockControls {
    /// Radians, counter-clockwise about +Y. Zero faces -Z.
    pub yaw: f32,
    /// Radians, positive looks up.
    pub pitch: f32,
    locked: bool,
    sensitivity: f32,
    invert_y: bool,
}

impl Default for PointerLockControls {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

impl PointerLockControls {
    /// Unlocked controls facing -Z. `sensitivity` multiplies
    /// [`BASE_LOOK_SENSITIVITY`].
    pub fn new(sensitivity: f32, invert_y: bool) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            locked: false,
            sensitivity: sensitivity * BASE_LOOK_SENSITIVITY,
            invert_y,
        }
    }

    /// Turn to face `target` from `eye`. Leaves the orientation unchanged if
    /// the two points coincide.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        let Some(dir) = (target - eye).try_normalize() else {
            return;
        };
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Apply relative mouse motion. Ignored while unlocked.
    pub fn look(&mut self, delta: Vec2) {
        if !self.locked {
            return;
        }
        let dy = if self.invert_y { -delta.y } else { delta.y };
        self.yaw -= delta.x * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Full view direction including pitch.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Horizontal unit vector to the camera's right.
    pub fn right_axis(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Horizontal unit vector the camera faces, ignoring pitch.
    pub fn forward_axis(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(-sin, 0.0, -cos)
    }

    /// Translate `position` along the facing plane. Height never changes.
    pub fn move_forward(&self, position: &mut Vec3, distance: f32) {
        *position += self.forward_axis() * distance;
    }

    /// Translate `position` sideways. Negative moves left.
    pub fn move_right(&self, position: &mut Vec3, distance: f32) {
        *position += self.right_axis() * distance;
    }
}
