//! View and projection matrices.

use glam::{Mat4, Quat, Vec3};

/// A perspective camera with reverse-Z projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit quaternion; identity looks down -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 60f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Perspective with near and far swapped, so depth runs 1 at the near
    /// plane to 0 at the far plane.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Maps clip-space points back to world-space directions from the
    /// camera, ignoring its position. Used to look up the sky.
    pub fn inverse_rotation_projection(&self) -> Mat4 {
        (self.projection_matrix() * Mat4::from_quat(self.rotation.inverse())).inverse()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Update the aspect ratio. Zero heights are ignored.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_reverse_z_maps_near_to_one_and_far_to_zero() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -camera.near));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -camera.far));
        assert!((near.z - 1.0).abs() < EPS, "near depth {}", near.z);
        assert!(far.z.abs() < EPS, "far depth {}", far.z);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera {
            position: Vec3::new(0.0, 50.0, 100.0),
            rotation: Quat::from_rotation_y(0.5),
            ..Camera::default()
        };
        let eye = camera.view_matrix().inverse().w_axis.truncate();
        assert!((eye - camera.position).length() < EPS);
    }

    #[test]
    fn test_point_ahead_lands_mid_screen() {
        let camera = Camera {
            position: Vec3::new(3.0, 4.0, 5.0),
            rotation: Quat::from_rotation_x(-0.3),
            ..Camera::default()
        };
        let target = camera.position + camera.forward() * 10.0;
        let ndc = camera.view_projection_matrix().project_point3(target);
        assert!(ndc.x.abs() < EPS && ndc.y.abs() < EPS);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_sky_direction_at_screen_center_is_forward() {
        let camera = Camera {
            rotation: Quat::from_rotation_y(1.0),
            ..Camera::default()
        };
        let p = camera.inverse_rotation_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let dir = (p.truncate() / p.w).normalize();
        assert!((dir - camera.forward()).length() < EPS, "{dir}");
    }

    #[test]
    fn test_aspect_ignores_zero_height() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1280, 0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < EPS);
        camera.set_aspect_ratio(1000, 500);
        assert!((camera.aspect_ratio - 2.0).abs() < EPS);
    }
}
