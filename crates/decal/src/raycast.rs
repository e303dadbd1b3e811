//! Ray-mesh intersection for surface picking.
//!
//! This module provides ray-triangle intersection using the Moller-Trumbore algorithm,
//! a slab test for early rejection against mesh bounds, and closest-hit queries over
//! a whole triangle mesh.

use glam::{Vec2, Vec3};

use crate::constants::EPSILON;
use crate::garment::{Aabb, MeshData};

/// A ray with an origin and a (not necessarily normalized) direction.
///
/// Hit distances are expressed in units of `direction`, so a ray transformed by an
/// affine matrix keeps the same `t` for the same point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both triangle faces are hittable; garments are thin shells seen from either side.
///
/// # Returns
/// `Some(TriangleHit)` if ray intersects in front of its origin, `None` otherwise
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON * EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);

    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Slab test against an axis-aligned box.
///
/// Returns the entry distance (or exit distance when the origin is inside).
pub fn ray_aabb_intersection(ray: &Ray, bounds: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        if ray.direction.x.abs() > EPSILON { 1.0 / ray.direction.x } else { f32::INFINITY },
        if ray.direction.y.abs() > EPSILON { 1.0 / ray.direction.y } else { f32::INFINITY },
        if ray.direction.z.abs() > EPSILON { 1.0 / ray.direction.z } else { f32::INFINITY },
    );

    let t1 = (bounds.min - ray.origin) * inv_dir;
    let t2 = (bounds.max - ray.origin) * inv_dir;

    // NaN from 0 * inf means the origin lies on a slab plane; treat it as inside
    let near = t1.min(t2);
    let far = t1.max(t2);
    let tmin = [near.x, near.y, near.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let tmax = [far.x, far.y, far.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::INFINITY, f32::min);

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin > 0.0 { tmin } else { tmax })
}

/// Closest intersection of a ray with a triangle mesh, in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Triangle index
    pub face_index: u32,
    /// Barycentric weights (w0, w1, w2)
    pub barycentric: Vec3,
    /// Unit geometric normal of the hit triangle (winding order)
    pub face_normal: Vec3,
    /// Interpolated UV if the mesh has UVs
    pub uv: Option<Vec2>,
}

/// Cast a ray against mesh data and return the closest hit.
///
/// # Arguments
/// * `ray` - Ray in mesh local space
/// * `mesh_data` - Mesh geometry
///
/// # Returns
/// `Some(MeshHit)` with the closest intersection, `None` if no hit
pub fn raycast_mesh(ray: &Ray, mesh_data: &MeshData) -> Option<MeshHit> {
    let mut closest_hit: Option<(TriangleHit, u32)> = None;

    // Test all triangles (brute force, bounds rejection happens in the caller)
    for tri_idx in 0..mesh_data.triangle_count() {
        let (v0, v1, v2) = mesh_data.triangle_positions(tri_idx);

        if let Some(hit) = ray_triangle_intersection(ray.origin, ray.direction, v0, v1, v2) {
            let dominated = match &closest_hit {
                Some((prev, _)) => hit.t >= prev.t,
                None => false,
            };
            if !dominated {
                closest_hit = Some((hit, tri_idx as u32));
            }
        }
    }

    closest_hit.map(|(hit, face_index)| {
        let (i0, i1, i2) = mesh_data.triangle_indices(face_index as usize);
        let (v0, v1, v2) = mesh_data.triangle_positions(face_index as usize);

        let face_normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        let uv = if mesh_data.has_uvs() {
            let uv0 = mesh_data.uvs[i0 as usize];
            let uv1 = mesh_data.uvs[i1 as usize];
            let uv2 = mesh_data.uvs[i2 as usize];
            Some(interpolate_vec2(uv0, uv1, uv2, hit.u, hit.v))
        } else {
            None
        };

        MeshHit {
            t: hit.t,
            face_index,
            barycentric: Vec3::new(1.0 - hit.u - hit.v, hit.u, hit.v),
            face_normal,
            uv,
        }
    })
}
