//! Garment geometry: loaded mesh hierarchies and the live garment instance.
//!
//! A [`GarmentMesh`] is what a loader produces: a tree of nodes, each with a local
//! transform and optionally a triangle mesh. A [`GarmentInstance`] is the flattened,
//! placed version the engine owns: every mesh node becomes a [`SubMesh`] whose
//! transform is relative to the garment root, and the root carries the placement
//! (position, uniform scale, rotation) that picking and decals are resolved against.

use glam::{Affine3A, EulerRot, Mat3, Quat, Vec2, Vec3};

use crate::loader::LoadError;
use crate::material::SurfaceMaterial;
use crate::types::{Color, GarmentId, SubMeshId};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set, `None` when empty
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_size(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Indexed triangle mesh in its own local space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals (same length as positions, or empty)
    pub normals: Vec<Vec3>,
    /// Vertex UVs (same length as positions, or empty)
    pub uvs: Vec<Vec2>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh. Empty `indices` means the positions are a triangle soup.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>, indices: Vec<u32>) -> Self {
        let indices = if indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            indices
        };
        Self {
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Check index bounds and attribute lengths.
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!("index count {} not divisible by 3", self.indices.len()));
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(format!(
                "index {} out of range for {} positions",
                bad,
                self.positions.len()
            ));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(format!(
                "{} normals for {} positions",
                self.normals.len(),
                self.positions.len()
            ));
        }
        if !self.uvs.is_empty() && self.uvs.len() != self.positions.len() {
            return Err(format!(
                "{} uvs for {} positions",
                self.uvs.len(),
                self.positions.len()
            ));
        }
        Ok(())
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Get the vertex indices for a triangle
    pub fn triangle_indices(&self, tri_index: usize) -> (u32, u32, u32) {
        let base = tri_index * 3;
        (
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        )
    }

    /// Get the vertex positions for a triangle
    pub fn triangle_positions(&self, tri_index: usize) -> (Vec3, Vec3, Vec3) {
        let (i0, i1, i2) = self.triangle_indices(tri_index);
        (
            self.positions[i0 as usize],
            self.positions[i1 as usize],
            self.positions[i2 as usize],
        )
    }

    /// Vertex normals of a triangle, falling back to its face normal
    pub fn triangle_normals(&self, tri_index: usize) -> (Vec3, Vec3, Vec3) {
        if self.has_normals() {
            let (i0, i1, i2) = self.triangle_indices(tri_index);
            (
                self.normals[i0 as usize],
                self.normals[i1 as usize],
                self.normals[i2 as usize],
            )
        } else {
            let (v0, v1, v2) = self.triangle_positions(tri_index);
            let n = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            (n, n, n)
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }
}

/// One node of a loaded garment hierarchy
#[derive(Debug, Clone, Default)]
pub struct GarmentNode {
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Affine3A,
    pub mesh: Option<MeshData>,
    /// Material the asset shipped with
    pub material: Option<SurfaceMaterial>,
    pub children: Vec<GarmentNode>,
}

impl GarmentNode {
    pub fn with_mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            ..Self::default()
        }
    }
}

/// Mesh hierarchy produced by a loader
#[derive(Debug, Clone, Default)]
pub struct GarmentMesh {
    pub roots: Vec<GarmentNode>,
}

impl GarmentMesh {
    /// Single-node garment
    pub fn from_mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            roots: vec![GarmentNode::with_mesh(name, mesh)],
        }
    }

    /// Total triangle count across every node
    pub fn triangle_count(&self) -> usize {
        fn count(node: &GarmentNode) -> usize {
            node.mesh.as_ref().map_or(0, MeshData::triangle_count)
                + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    /// Reject hierarchies that cannot be picked or clipped.
    pub fn validate(&self, path: &str) -> Result<(), LoadError> {
        fn check(node: &GarmentNode, path: &str) -> Result<(), LoadError> {
            if let Some(mesh) = &node.mesh {
                mesh.validate().map_err(|reason| LoadError::InvalidGeometry {
                    path: path.to_string(),
                    reason: format!("node {:?}: {}", node.name, reason),
                })?;
            }
            node.children.iter().try_for_each(|child| check(child, path))
        }

        self.roots.iter().try_for_each(|node| check(node, path))?;
        if self.triangle_count() == 0 {
            return Err(LoadError::NoGeometry(path.to_string()));
        }
        Ok(())
    }

    /// Depth-first flattening into root-relative sub-meshes
    fn flatten(self) -> Vec<SubMesh> {
        fn visit(node: GarmentNode, parent: Affine3A, out: &mut Vec<SubMesh>) {
            let transform = parent * node.transform;
            if let Some(mesh) = node.mesh {
                let bounds = mesh.bounds();
                out.push(SubMesh {
                    name: node.name,
                    transform,
                    mesh,
                    bounds,
                    material: node.material.unwrap_or_default(),
                });
            }
            for child in node.children {
                visit(child, transform, out);
            }
        }

        let mut out = Vec::new();
        for root in self.roots {
            visit(root, Affine3A::IDENTITY, &mut out);
        }
        out
    }
}

/// A mesh of the live garment, placed relative to the garment root
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub name: String,
    /// Sub-mesh local -> garment root
    pub transform: Affine3A,
    pub mesh: MeshData,
    /// Local-space bounds, `None` for a mesh without vertices
    pub bounds: Option<Aabb>,
    pub material: SurfaceMaterial,
}

/// Placement of the garment root in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTransform {
    pub position: Vec3,
    pub scale: f32,
    /// Euler angles (XYZ order)
    pub rotation: Vec3,
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Vec3::ZERO,
        }
    }
}

impl RootTransform {
    pub fn matrix(&self) -> Affine3A {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Affine3A::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

/// The currently loaded garment
#[derive(Debug, Clone)]
pub struct GarmentInstance {
    id: GarmentId,
    source: String,
    root: RootTransform,
    sub_meshes: Vec<SubMesh>,
}

impl GarmentInstance {
    pub fn new(id: GarmentId, source: impl Into<String>, mesh: GarmentMesh, root: RootTransform) -> Self {
        Self {
            id,
            source: source.into(),
            root,
            sub_meshes: mesh.flatten(),
        }
    }

    pub fn id(&self) -> GarmentId {
        self.id
    }

    /// Path the garment was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &RootTransform {
        &self.root
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    pub fn sub_mesh(&self, id: SubMeshId) -> Option<&SubMesh> {
        self.sub_meshes.get(id.0)
    }

    /// Same checks as [`GarmentMesh::validate`], on the flattened sub-meshes.
    pub fn validate(&self) -> Result<(), LoadError> {
        for sub in &self.sub_meshes {
            sub.mesh.validate().map_err(|reason| LoadError::InvalidGeometry {
                path: self.source.clone(),
                reason: format!("sub-mesh {:?}: {}", sub.name, reason),
            })?;
        }
        if self.sub_meshes.iter().all(|sub| sub.mesh.triangle_count() == 0) {
            return Err(LoadError::NoGeometry(self.source.clone()));
        }
        Ok(())
    }

    /// Garment root -> world
    pub fn world_matrix(&self) -> Affine3A {
        self.root.matrix()
    }

    /// Sub-mesh local -> world
    pub fn sub_mesh_world_matrix(&self, id: SubMeshId) -> Option<Affine3A> {
        self.sub_mesh(id)
            .map(|sub| self.world_matrix() * sub.transform)
    }

    /// Recolor every surface. Decals are separate objects and are not touched.
    pub fn set_color(&mut self, color: Color) {
        for sub in &mut self.sub_meshes {
            sub.material.base_color = color;
        }
    }

    /// Replace every surface material with `material`.
    pub fn set_material(&mut self, material: &SurfaceMaterial) {
        for sub in &mut self.sub_meshes {
            sub.material = material.clone();
        }
    }

    /// Add `delta` to the root's Y angle, clamped to `[-limit, limit]`.
    ///
    /// Angles compose as intrinsic XYZ Euler rotations, so with a non-zero X
    /// tilt the turn is about the tilted Y axis rather than world Y.
    /// Returns the resulting Y angle.
    pub fn rotate_y(&mut self, delta: f32, limit: f32) -> f32 {
        self.root.rotation.y = (self.root.rotation.y + delta).clamp(-limit, limit);
        self.root.rotation.y
    }
}

/// Matrix taking directions to world space while keeping them perpendicular to
/// transformed surfaces (inverse transpose of the linear part).
pub fn normal_matrix(transform: &Affine3A) -> Mat3 {
    Mat3::from(transform.matrix3).inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(z: f32) -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ],
            vec![Vec3::Z; 4],
            vec![],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_soup_gets_sequential_indices() {
        let mesh = MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![], vec![], vec![]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
        let (n0, _, _) = mesh.triangle_normals(0);
        assert!((n0 - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mut mesh = quad(0.0);
        mesh.indices[5] = 9;
        assert!(mesh.validate().is_err());

        let garment = GarmentMesh::from_mesh("body", mesh);
        assert!(matches!(
            garment.validate("bad.glb"),
            Err(LoadError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_garment() {
        let garment = GarmentMesh {
            roots: vec![GarmentNode::default()],
        };
        assert!(matches!(garment.validate("empty.glb"), Err(LoadError::NoGeometry(_))));
    }

    #[test]
    fn test_flatten_accumulates_transforms() {
        let mut sleeve = GarmentNode::with_mesh("sleeve", quad(0.0));
        sleeve.transform = Affine3A::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let mut body = GarmentNode::with_mesh("body", quad(0.0));
        body.transform = Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0));
        body.children.push(sleeve);

        let instance = GarmentInstance::new(
            GarmentId(1),
            "test",
            GarmentMesh { roots: vec![body] },
            RootTransform::default(),
        );

        assert_eq!(instance.sub_meshes().len(), 2);
        let sleeve_world = instance.sub_mesh_world_matrix(SubMeshId(1)).unwrap();
        let origin = sleeve_world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_rotation_is_clamped() {
        let mut instance = GarmentInstance::new(
            GarmentId(1),
            "test",
            GarmentMesh::from_mesh("body", quad(0.0)),
            RootTransform::default(),
        );
        let limit = std::f32::consts::FRAC_PI_4;
        assert!((instance.rotate_y(0.5, limit) - 0.5).abs() < 1e-6);
        assert!((instance.rotate_y(10.0, limit) - limit).abs() < 1e-6);
        assert!((instance.rotate_y(-100.0, limit) + limit).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_turns_about_tilted_axis() {
        let root = RootTransform {
            rotation: Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            ..RootTransform::default()
        };
        let mut instance =
            GarmentInstance::new(GarmentId(1), "test", GarmentMesh::from_mesh("body", quad(0.0)), root);
        instance.rotate_y(0.3, std::f32::consts::FRAC_PI_4);

        // The turn axis is root Y carried through the X tilt, here world Z
        let axis = instance.world_matrix().transform_vector3(Vec3::Y);
        assert!((axis - Vec3::Z).length() < 1e-5);
        let turned = instance.world_matrix().transform_vector3(Vec3::X);
        assert!(turned.z.abs() < 1e-5);
        assert!((turned.y - 0.3_f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_instance_validate_catches_attribute_mismatch() {
        let mut mesh = quad(0.0);
        mesh.uvs = vec![Vec2::ZERO; 4];
        let good = GarmentInstance::new(
            GarmentId(1),
            "good.glb",
            GarmentMesh::from_mesh("body", mesh.clone()),
            RootTransform::default(),
        );
        assert!(good.validate().is_ok());

        mesh.uvs.truncate(1);
        let bad = GarmentInstance::new(
            GarmentId(2),
            "bad.glb",
            GarmentMesh::from_mesh("body", mesh),
            RootTransform::default(),
        );
        assert!(matches!(
            bad.validate(),
            Err(LoadError::InvalidGeometry { path, .. }) if path == "bad.glb"
        ));

        let empty = GarmentInstance::new(GarmentId(3), "empty.glb", GarmentMesh::default(), RootTransform::default());
        assert!(matches!(empty.validate(), Err(LoadError::NoGeometry(_))));
    }

    #[test]
    fn test_set_color_reaches_every_sub_mesh() {
        let mut body = GarmentNode::with_mesh("body", quad(0.0));
        body.children.push(GarmentNode::with_mesh("collar", quad(0.1)));
        let mut instance = GarmentInstance::new(
            GarmentId(1),
            "test",
            GarmentMesh { roots: vec![body] },
            RootTransform::default(),
        );

        let green = Color::rgb(0.0, 1.0, 0.0);
        instance.set_color(green);
        assert!(instance.sub_meshes().iter().all(|s| s.material.base_color == green));
    }
}
