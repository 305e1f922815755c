use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::frustum::FrustumParams;

/// Read-only view of a camera's pose and matrices.
pub trait Camera {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    fn position(&self) -> Vec3;
    /// World-space orientation; local -Z is the viewing direction.
    fn rotation(&self) -> Mat3;
}

/// Camera whose frustum is being visualized.
pub trait TargetCamera: Camera {
    fn near(&self) -> f32;
    fn far(&self) -> f32;
    /// Vertical field of view in degrees.
    fn fov(&self) -> f32;
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn aspect(&self) -> f32 {
        self.width() / self.height()
    }

    fn frustum_params(&self) -> FrustumParams {
        FrustumParams {
            near: self.near(),
            far: self.far(),
            fov: self.fov(),
            aspect: self.aspect(),
        }
    }
}

/// Perspective camera positioned in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    width: f32,
    height: f32,
    fov: f32,
    near: f32,
    far: f32,
    position: Vec3,
    rotation: Mat3,
}

impl PerspectiveCamera {
    pub fn new(width: f32, height: f32, fov: f32, near: f32, far: f32) -> Self {
        Self {
            width,
            height,
            fov,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Orients the camera towards `target` keeping +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        let forward = forward.normalize();
        // Looking straight up or down: fall back to +Z as the up hint.
        let up = if forward.cross(Vec3::Y).length_squared() <= f32::EPSILON {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        self.rotation = Mat3::from_cols(right, up, -forward);
    }

    pub fn update_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            self.rotation.x_axis.extend(0.0),
            self.rotation.y_axis.extend(0.0),
            self.rotation.z_axis.extend(0.0),
            self.position.extend(1.0),
        )
    }
}

impl Camera for PerspectiveCamera {
    fn view_matrix(&self) -> Mat4 {
        // The rotation block is orthonormal, so the inverse is its transpose.
        let inverse_rotation = self.rotation.transpose();
        let translation = -(inverse_rotation * self.position);
        Mat4::from_cols(
            inverse_rotation.x_axis.extend(0.0),
            inverse_rotation.y_axis.extend(0.0),
            inverse_rotation.z_axis.extend(0.0),
            translation.extend(1.0),
        )
    }

    fn projection_matrix(&self) -> Mat4 {
        let aspect = if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Mat3 {
        self.rotation
    }
}

impl TargetCamera for PerspectiveCamera {
    fn near(&self) -> f32 {
        self.near
    }

    fn far(&self) -> f32 {
        self.far
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }
}
