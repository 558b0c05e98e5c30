//! Camera pose produced by the rig each frame

use serde::{Deserialize, Serialize};

use crate::core::types::{Mat4, Quat, Vec3};

/// Observer-relative camera placement.
///
/// `position` is in display space: X/Z relative to the streaming reference,
/// Y absolute elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    /// Nose-up rotation around X in radians
    pub pitch: f32,
    /// Bank around the view axis in radians, positive raises the right side
    pub roll: f32,
    /// Heading around Y in radians, 0 looks down -Z
    pub yaw: f32,
}

impl CameraPose {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }

    /// Rotation as quaternion (yaw, then pitch, then roll)
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(glam::EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Get view matrix (display space to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation().conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Combined view-projection for a perspective lens
    pub fn view_projection(&self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(fov_y, aspect, near, far) * self.view_matrix()
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Get up direction (positive Y in camera space)
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions() {
        let pose = CameraPose::default();

        // Default pose looks down -Z
        let forward = pose.forward();
        assert!((forward.z - (-1.0)).abs() < 0.001);

        let right = pose.right();
        assert!((right.x - 1.0).abs() < 0.001);

        let up = pose.up();
        assert!((up.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pitch_and_roll_signs() {
        let mut pose = CameraPose::default();
        pose.pitch = 0.3;
        assert!(pose.forward().y > 0.0);

        pose.pitch = 0.0;
        pose.roll = 0.3;
        assert!(pose.right().y > 0.0);
    }

    #[test]
    fn test_view_matrix_translation() {
        let pose = CameraPose::new(Vec3::new(10.0, 0.0, 0.0));

        let view = pose.view_matrix();
        // Origin lands at (-10, 0, 0) in camera space
        let origin_in_camera = view.transform_point3(Vec3::ZERO);
        assert!((origin_in_camera.x - (-10.0)).abs() < 0.001);
    }

    #[test]
    fn test_view_projection_invertible() {
        let pose = CameraPose::new(Vec3::new(0.0, 5.0, 0.0));
        let vp = pose.view_projection(60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let identity = vp * vp.inverse();
        assert!((identity.w_axis.w - 1.0).abs() < 0.001);
    }
}
