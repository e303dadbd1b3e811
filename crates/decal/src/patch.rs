//! Decal patch building.
//!
//! The target mesh is moved into the projector frame of a [`DecalOrientation`]
//! (origin at the hit point, axes along the decal frame) and clipped against the
//! six planes of the projection box. What survives is re-triangulated and mapped
//! back out, with UVs taken straight from the projector-space X/Y position.

use glam::{Affine3A, Vec2, Vec3};

use crate::garment::{normal_matrix, MeshData};
use crate::orientation::DecalOrientation;
use crate::types::DecalVertex;

/// Non-indexed triangle list of a decal patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecalGeometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
}

impl DecalGeometry {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Copy of the patch with positions and normals moved by `transform`.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let normal_matrix = normal_matrix(transform);
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| transform.transform_point3(*p))
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|n| (normal_matrix * *n).normalize_or_zero())
                .collect(),
            uvs: self.uvs.clone(),
        }
    }

    /// Interleaved vertices ready for a vertex buffer
    pub fn vertices(&self) -> Vec<DecalVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| DecalVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: Vec2) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
    }
}

/// Polygon vertex during clipping. Position is in projector space, normal in world space.
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    position: Vec3,
    normal: Vec3,
}

impl ClipVertex {
    fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

/// One face of the projection box: `sign * position[axis] <= limit` is inside.
#[derive(Debug, Clone, Copy)]
struct ClipPlane {
    axis: usize,
    sign: f32,
    limit: f32,
}

impl ClipPlane {
    fn box_faces(half_extents: Vec3) -> [ClipPlane; 6] {
        let face = |axis: usize, sign: f32| ClipPlane {
            axis,
            sign,
            limit: half_extents[axis],
        };
        [
            face(0, 1.0),
            face(0, -1.0),
            face(1, 1.0),
            face(1, -1.0),
            face(2, 1.0),
            face(2, -1.0),
        ]
    }

    /// Positive outside the box
    fn distance(&self, point: Vec3) -> f32 {
        self.sign * point[self.axis] - self.limit
    }

    /// Sutherland-Hodgman against this plane
    fn clip(&self, input: &[ClipVertex], output: &mut Vec<ClipVertex>) {
        output.clear();
        let Some(last) = input.last() else {
            return;
        };

        let mut prev = *last;
        let mut prev_dist = self.distance(prev.position);
        for current in input {
            let dist = self.distance(current.position);
            let inside = dist <= 0.0;
            let prev_inside = prev_dist <= 0.0;

            if inside != prev_inside {
                let t = prev_dist / (prev_dist - dist);
                output.push(prev.lerp(current, t));
            }
            if inside {
                output.push(*current);
            }

            prev = *current;
            prev_dist = dist;
        }
    }
}

/// Clip a mesh down to the footprint of a decal.
///
/// # Arguments
/// * `mesh` - Target mesh in its local space
/// * `mesh_to_world` - Local -> world transform of the target mesh
/// * `orientation` - World-space decal frame and projection box
///
/// # Returns
/// World-space patch geometry. Empty when no triangle reaches the projection box.
pub fn build_patch(mesh: &MeshData, mesh_to_world: &Affine3A, orientation: &DecalOrientation) -> DecalGeometry {
    let to_projector = orientation.matrix().inverse() * *mesh_to_world;
    let normal_to_world = normal_matrix(mesh_to_world);
    let projector_to_world = orientation.matrix();
    let half = orientation.half_extents;
    let radius = orientation.bounding_radius();
    let planes = ClipPlane::box_faces(half);

    let mut geometry = DecalGeometry::default();
    let mut polygon = Vec::with_capacity(9);
    let mut scratch = Vec::with_capacity(9);

    for tri in 0..mesh.triangle_count() {
        let (p0, p1, p2) = mesh.triangle_positions(tri);
        let corners = [
            to_projector.transform_point3(p0),
            to_projector.transform_point3(p1),
            to_projector.transform_point3(p2),
        ];

        // Bounding-sphere rejection against the sphere around the box
        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        let tri_radius = corners
            .iter()
            .map(|c| c.distance(centroid))
            .fold(0.0_f32, f32::max);
        if centroid.length() > radius + tri_radius {
            continue;
        }

        let (n0, n1, n2) = mesh.triangle_normals(tri);
        polygon.clear();
        polygon.extend(corners.iter().zip([n0, n1, n2]).map(|(p, n)| ClipVertex {
            position: *p,
            normal: (normal_to_world * n).normalize_or_zero(),
        }));

        for plane in &planes {
            plane.clip(&polygon, &mut scratch);
            std::mem::swap(&mut polygon, &mut scratch);
            if polygon.len() < 3 {
                break;
            }
        }
        if polygon.len() < 3 {
            continue;
        }

        // Clipping a convex polygon keeps it convex, so a fan is enough
        for i in 1..polygon.len() - 1 {
            for vertex in [polygon[0], polygon[i], polygon[i + 1]] {
                let uv = Vec2::new(
                    vertex.position.x / (2.0 * half.x) + 0.5,
                    vertex.position.y / (2.0 * half.y) + 0.5,
                );
                geometry.push(
                    projector_to_world.transform_point3(vertex.position),
                    vertex.normal.normalize_or_zero(),
                    uv,
                );
            }
        }
    }

    geometry
}
