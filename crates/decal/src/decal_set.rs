//! Placed decals and their lifecycle.

use tracing::debug;

use crate::material::DecalMaterial;
use crate::orientation::DecalOrientation;
use crate::patch::DecalGeometry;
use crate::scene::SceneAttachable;
use crate::types::{DecalId, GarmentId, SubMeshId};

/// A placed image patch, parented under one garment
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    id: DecalId,
    parent: GarmentId,
    target: SubMeshId,
    /// Patch in garment-root space, so it follows the garment pose
    geometry: DecalGeometry,
    material: DecalMaterial,
    /// World-space frame at placement time
    orientation: DecalOrientation,
}

impl Decal {
    pub fn id(&self) -> DecalId {
        self.id
    }

    pub fn parent(&self) -> GarmentId {
        self.parent
    }

    /// Sub-mesh the click landed on
    pub fn target(&self) -> SubMeshId {
        self.target
    }

    pub fn geometry(&self) -> &DecalGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &DecalMaterial {
        &self.material
    }

    pub fn orientation(&self) -> &DecalOrientation {
        &self.orientation
    }
}

/// Every decal currently in the scene.
///
/// The set is the only place decals get attached or detached, so membership here
/// and parenting in the scene stay in lockstep.
#[derive(Debug, Clone, Default)]
pub struct DecalSet {
    decals: Vec<Decal>,
    next_id: u64,
}

impl DecalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new decal under `parent` and keep it.
    ///
    /// Returns `None` without touching the scene when the patch is empty.
    pub fn insert<S: SceneAttachable>(
        &mut self,
        scene: &mut S,
        parent: GarmentId,
        target: SubMeshId,
        geometry: DecalGeometry,
        material: DecalMaterial,
        orientation: DecalOrientation,
    ) -> Option<DecalId> {
        if geometry.is_empty() {
            debug!("Discarding empty decal patch on {:?}", parent);
            return None;
        }

        let id = DecalId(self.next_id);
        self.next_id += 1;

        let decal = Decal {
            id,
            parent,
            target,
            geometry,
            material,
            orientation,
        };
        scene.attach_decal(parent, &decal);
        debug!(
            "Attached decal {:?} under {:?} ({} triangles)",
            id,
            parent,
            decal.geometry.triangle_count()
        );
        self.decals.push(decal);
        Some(id)
    }

    /// Detach and drop every decal. Returns how many were removed.
    pub fn clear<S: SceneAttachable>(&mut self, scene: &mut S) -> usize {
        let count = self.decals.len();
        for decal in self.decals.drain(..) {
            scene.detach_decal(decal.parent, decal.id);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.decals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decal> {
        self.decals.iter()
    }

    pub fn get(&self, id: DecalId) -> Option<&Decal> {
        self.decals.iter().find(|d| d.id == id)
    }
}
