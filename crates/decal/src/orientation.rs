//! Decal orientation from a surface hit.
//!
//! The decal frame is a look-at basis whose local +Z is the surface normal, so the
//! frame's forward axis (local -Z) points into the surface. A fixed half turn about
//! local Z follows, otherwise the stamped image comes out mirrored.

use std::f32::consts::PI;

use glam::{Affine3A, Mat3, Quat, Vec3};

use crate::constants::{EPSILON, FALLBACK_UP, WORLD_UP};

/// Position, rotation and projection box of a decal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalOrientation {
    /// World-space center of the projection box
    pub position: Vec3,
    /// World-space rotation of the decal frame
    pub rotation: Quat,
    /// Half-extents of the projection box along local X/Y/Z
    pub half_extents: Vec3,
}

impl DecalOrientation {
    /// Direction the decal projects along (local -Z in world space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Decal frame -> world (no scale)
    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }

    /// Radius of the sphere enclosing the projection box
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents.length()
    }
}

/// Rotation of a look-at basis: local +Z points from `target` to `eye`.
///
/// Falls back to [`FALLBACK_UP`] when the view direction is parallel to `up`.
/// A zero-length view direction is treated as +Z.
pub fn look_at_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let z = (eye - target).try_normalize().unwrap_or(Vec3::Z);

    let mut x = up.cross(z);
    if x.length_squared() < EPSILON {
        let fallback = if up.abs_diff_eq(FALLBACK_UP, EPSILON) { WORLD_UP } else { FALLBACK_UP };
        x = fallback.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Orient a decal at a surface hit.
///
/// # Arguments
/// * `point` - World-space hit point
/// * `normal` - World-space surface normal (need not be unit length)
/// * `half_extents` - Projection box half-extents
pub fn orient(point: Vec3, normal: Vec3, half_extents: Vec3) -> DecalOrientation {
    let basis = look_at_rotation(normal, Vec3::ZERO, WORLD_UP);
    let rotation = (basis * Quat::from_rotation_z(PI)).normalize();

    DecalOrientation {
        position: point,
        rotation,
        half_extents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec3 = Vec3::splat(0.125);

    fn assert_forward_is_negated_normal(normal: Vec3) {
        let orientation = orient(Vec3::ZERO, normal, HALF);
        let expected = -normal.normalize();
        assert!(
            (orientation.forward() - expected).length() < 1e-5,
            "normal {normal:?}: forward {:?}",
            orientation.forward()
        );
        assert!((orientation.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_opposes_normal() {
        for normal in [
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::X,
            Vec3::NEG_X,
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-0.3, 0.2, 0.9),
            Vec3::new(0.0, -0.7, 0.7),
        ] {
            assert_forward_is_negated_normal(normal);
        }
    }

    #[test]
    fn test_vertical_normal_uses_fallback_up() {
        for normal in [Vec3::Y, Vec3::NEG_Y] {
            let orientation = orient(Vec3::ZERO, normal, HALF);
            assert!(!orientation.rotation.is_nan());
            assert!((orientation.forward() + normal).length() < 1e-5);
        }
    }

    #[test]
    fn test_half_turn_about_local_z() {
        // Facing the viewer, the decal's local X points to world -X
        let orientation = orient(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, HALF);
        let local_x = orientation.rotation * Vec3::X;
        let local_y = orientation.rotation * Vec3::Y;
        assert!((local_x - Vec3::NEG_X).length() < 1e-5);
        assert!((local_y - Vec3::NEG_Y).length() < 1e-5);
        assert_eq!(orientation.position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_matrix_maps_origin_to_position() {
        let position = Vec3::new(0.3, 1.1, 0.2);
        let orientation = orient(position, Vec3::new(0.2, 0.1, 1.0), HALF);
        let mapped = orientation.matrix().transform_point3(Vec3::ZERO);
        assert!((mapped - position).length() < 1e-6);
        assert!((orientation.bounding_radius() - HALF.length()).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_handles_zero_direction() {
        let rotation = look_at_rotation(Vec3::ZERO, Vec3::ZERO, Vec3::Y);
        assert!((rotation * Vec3::Z - Vec3::Z).length() < 1e-5);
    }
}
