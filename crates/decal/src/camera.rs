//! Perspective viewer camera and pointer-to-ray conversion.

use atelier_config::CameraConfig;
use atelier_ipc::ViewportRect;
use glam::{Mat4, Vec2, Vec3};

use crate::raycast::Ray;

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the eye through a normalized device coordinate.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(ndc.extend(0.5));
        Ray::new(self.position, (through - self.position).normalize())
    }

    /// Normalized device coordinates of a world point (x right, y up).
    pub fn project(&self, point: Vec3) -> Vec2 {
        self.view_projection().project_point3(point).truncate()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), ViewportRect::default().aspect())
    }
}

/// Convert a client-space pointer position into [-1, 1] device coordinates.
///
/// Y is flipped (screen-down to NDC-up). `None` for a collapsed viewport.
pub fn pointer_to_ndc(pointer: Vec2, viewport: &ViewportRect) -> Option<Vec2> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        ((pointer.x - viewport.left) / viewport.width) * 2.0 - 1.0,
        -((pointer.y - viewport.top) / viewport.height) * 2.0 + 1.0,
    ))
}

/// Inverse of [`pointer_to_ndc`]
pub fn ndc_to_pointer(ndc: Vec2, viewport: &ViewportRect) -> Vec2 {
    Vec2::new(
        viewport.left + (ndc.x + 1.0) * 0.5 * viewport.width,
        viewport.top + (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}
