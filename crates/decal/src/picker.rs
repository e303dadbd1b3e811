//! Surface picking: pointer position -> closest point on the garment.

use atelier_ipc::ViewportRect;
use glam::Vec2;

use crate::camera::{pointer_to_ndc, Camera};
use crate::garment::{normal_matrix, GarmentInstance};
use crate::raycast::{ray_aabb_intersection, raycast_mesh, Ray};
use crate::types::{SubMeshId, SurfaceHit};

/// Cast a pointer ray into the scene and return the closest garment hit.
///
/// # Arguments
/// * `pointer` - Client-space pointer position
/// * `viewport` - Bounding rectangle of the viewer in the same space
/// * `camera` - Viewer camera
/// * `garment` - Live garment, if one is loaded
///
/// # Returns
/// `None` when nothing is loaded, the viewport is collapsed, or the ray misses.
pub fn pick(
    pointer: Vec2,
    viewport: &ViewportRect,
    camera: &Camera,
    garment: Option<&GarmentInstance>,
) -> Option<SurfaceHit> {
    let garment = garment?;
    let ndc = pointer_to_ndc(pointer, viewport)?;
    pick_ray(&camera.ray_from_ndc(ndc), garment)
}

/// Intersect a world-space ray with every sub-mesh of the garment.
pub fn pick_ray(ray: &Ray, garment: &GarmentInstance) -> Option<SurfaceHit> {
    let mut closest: Option<SurfaceHit> = None;

    for (index, sub) in garment.sub_meshes().iter().enumerate() {
        let id = SubMeshId(index);
        let Some(to_world) = garment.sub_mesh_world_matrix(id) else {
            continue;
        };

        // The direction is not renormalized so local t equals world t
        let to_local = to_world.inverse();
        let local_ray = Ray::new(
            to_local.transform_point3(ray.origin),
            to_local.transform_vector3(ray.direction),
        );

        let hits_bounds = sub
            .bounds
            .as_ref()
            .is_some_and(|bounds| ray_aabb_intersection(&local_ray, bounds).is_some());
        if !hits_bounds {
            continue;
        }

        let Some(hit) = raycast_mesh(&local_ray, &sub.mesh) else {
            continue;
        };
        if closest.as_ref().is_some_and(|c| hit.t >= c.distance) {
            continue;
        }

        let normal = (normal_matrix(&to_world) * hit.face_normal).normalize_or_zero();
        closest = Some(SurfaceHit {
            garment: garment.id(),
            sub_mesh: id,
            face_index: hit.face_index,
            point: ray.at(hit.t),
            normal,
            distance: hit.t,
            barycentric: hit.barycentric,
            uv: hit.uv,
        });
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ndc_to_pointer;
    use crate::garment::{GarmentMesh, GarmentNode, MeshData, RootTransform};
    use crate::types::GarmentId;
    use glam::{Affine3A, Vec3};

    /// Vertical square facing +Z, centered at (0, 1.2, z)
    fn panel(z: f32, half: f32) -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(-half, 1.2 - half, z),
                Vec3::new(half, 1.2 - half, z),
                Vec3::new(half, 1.2 + half, z),
                Vec3::new(-half, 1.2 + half, z),
            ],
            vec![Vec3::Z; 4],
            vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn garment(mesh: GarmentMesh) -> GarmentInstance {
        GarmentInstance::new(GarmentId(7), "test", mesh, RootTransform::default())
    }

    #[test]
    fn test_pick_center_hits_front_face() {
        let garment = garment(GarmentMesh::from_mesh("front", panel(0.0, 0.5)));
        let viewport = ViewportRect::default();
        let camera = Camera::default();
        let center = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);

        let hit = pick(center, &viewport, &camera, Some(&garment)).unwrap();
        assert_eq!(hit.garment, GarmentId(7));
        assert_eq!(hit.sub_mesh, SubMeshId(0));
        assert!(hit.point.z.abs() < 1e-4);
        assert!((hit.point.y - 1.2).abs() < 1e-3);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!(hit.uv.is_some());
    }

    #[test]
    fn test_pick_outside_projection_misses() {
        let garment = garment(GarmentMesh::from_mesh("front", panel(0.0, 0.2)));
        let viewport = ViewportRect::default();
        let camera = Camera::default();

        for pointer in [
            Vec2::new(1.0, 1.0),
            Vec2::new(viewport.width - 1.0, viewport.height - 1.0),
            Vec2::new(viewport.width - 1.0, 1.0),
            Vec2::new(1.0, viewport.height - 1.0),
        ] {
            assert!(pick(pointer, &viewport, &camera, Some(&garment)).is_none());
        }
    }

    #[test]
    fn test_pick_without_garment() {
        let viewport = ViewportRect::default();
        let center = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
        assert!(pick(center, &viewport, &Camera::default(), None).is_none());
    }

    #[test]
    fn test_pick_closest_sub_mesh_in_hierarchy() {
        let mut back = GarmentNode::with_mesh("back", panel(-0.2, 0.5));
        back.children.push(GarmentNode::with_mesh("front", panel(0.1, 0.5)));
        let garment = garment(GarmentMesh { roots: vec![back] });

        let viewport = ViewportRect::default();
        let center = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
        let hit = pick(center, &viewport, &Camera::default(), Some(&garment)).unwrap();
        assert_eq!(hit.sub_mesh, SubMeshId(1));
        assert!((hit.point.z - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_pick_respects_root_transform() {
        let mesh = GarmentMesh::from_mesh("front", panel(0.0, 0.1));
        let root = RootTransform {
            position: Vec3::new(0.5, 0.0, 0.0),
            ..RootTransform::default()
        };
        let garment = GarmentInstance::new(GarmentId(1), "test", mesh, root);

        let camera = Camera::default();
        let viewport = ViewportRect::default();
        let target = Vec3::new(0.5, 1.2, 0.0);
        let pointer = ndc_to_pointer(camera.project(target), &viewport);

        let hit = pick(pointer, &viewport, &camera, Some(&garment)).unwrap();
        assert!((hit.point - target).length() < 1e-3);

        // The untranslated location is now empty
        let empty = ndc_to_pointer(camera.project(Vec3::new(0.0, 1.2, 0.0)), &viewport);
        assert!(pick(empty, &viewport, &camera, Some(&garment)).is_none());
    }

    #[test]
    fn test_pick_normal_follows_sub_mesh_rotation() {
        let mut node = GarmentNode::with_mesh("side", panel(0.0, 0.5));
        node.transform = Affine3A::from_rotation_y(0.3);
        let garment = garment(GarmentMesh { roots: vec![node] });

        let ray = Ray::new(Vec3::new(0.0, 1.2, 3.0), Vec3::NEG_Z);
        let hit = pick_ray(&ray, &garment).unwrap();
        let expected = Affine3A::from_rotation_y(0.3).transform_vector3(Vec3::Z);
        assert!((hit.normal - expected).length() < 1e-5);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }
}
