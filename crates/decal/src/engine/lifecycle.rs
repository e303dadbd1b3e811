//! Decal placement and removal

use glam::{Vec2, Vec3};
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::material::DecalMaterial;
use crate::orientation::orient;
use crate::patch::build_patch;
use crate::picker::pick;
use crate::scene::SceneAttachable;
use crate::texture::{PreparedTexture, TextureError, TextureHandle};
use crate::types::{DecalId, SurfaceHit};

use super::EngineState;

impl<S: SceneAttachable> EngineState<S> {
    /// Surface under a client-space pointer position.
    ///
    /// Nothing is picked until an image has been uploaded.
    pub fn pick(&self, pointer: Vec2) -> Option<SurfaceHit> {
        if self.texture.is_none() {
            debug!("Pick ignored: no image uploaded");
            return None;
        }
        pick(pointer, &self.viewport, &self.camera, self.garment.as_ref())
    }

    /// Stamp the uploaded image at `hit`.
    ///
    /// Returns `None` and leaves the scene untouched when no image is uploaded,
    /// the hit belongs to a garment that is no longer live, or the patch is empty.
    pub fn apply_decal(&mut self, hit: &SurfaceHit) -> Option<DecalId> {
        let Some(texture) = self.texture.clone() else {
            debug!("Ignoring decal request: no image uploaded");
            return None;
        };
        let Some(garment) = self.garment.as_ref() else {
            warn!("Ignoring decal request for {:?}: no garment loaded", hit.garment);
            return None;
        };
        if garment.id() != hit.garment {
            warn!(
                "Ignoring stale hit on {:?}, live garment is {:?}",
                hit.garment,
                garment.id()
            );
            return None;
        }
        let (Some(sub), Some(to_world)) = (
            garment.sub_mesh(hit.sub_mesh),
            garment.sub_mesh_world_matrix(hit.sub_mesh),
        ) else {
            warn!("Ignoring hit on unknown sub-mesh {:?}", hit.sub_mesh);
            return None;
        };

        let orientation = orient(hit.point, hit.normal, Vec3::from_array(self.config.decal.half_extents));
        let patch = build_patch(&sub.mesh, &to_world, &orientation);
        if patch.is_empty() {
            debug!("Decal patch at {:?} is empty, discarding", hit.point);
            return None;
        }

        // Stored relative to the garment root so the patch follows the pose
        let local = patch.transformed(&garment.world_matrix().inverse());
        let material = DecalMaterial::new(texture, &self.config.decal);
        self.decals
            .insert(&mut self.scene, garment.id(), hit.sub_mesh, local, material, orientation)
    }

    /// Pick at `pointer` and stamp the uploaded image there.
    pub fn click(&mut self, pointer: Vec2) -> Option<DecalId> {
        let hit = self.pick(pointer)?;
        self.apply_decal(&hit)
    }

    /// Remove every decal. Idempotent; returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.decals.clear(&mut self.scene);
        if removed > 0 {
            info!("Cleared {} decals", removed);
        }
        removed
    }

    /// Forget the uploaded image and remove every decal.
    pub fn remove_images(&mut self) -> usize {
        self.texture = None;
        self.clear_all()
    }

    /// Use an already prepared texture for subsequent decals.
    ///
    /// Decals placed earlier keep the image they were stamped with.
    pub fn set_uploaded_texture(&mut self, texture: TextureHandle) {
        debug!("Uploaded texture {:?} ({})", texture.id(), texture.label());
        self.texture = Some(texture);
    }

    /// Preprocess a decoded user image and make it the stamping texture.
    ///
    /// The returned image is what the host should upload for the handle.
    pub fn upload_image(&mut self, label: &str, image: RgbaImage) -> Result<PreparedTexture, TextureError> {
        let prepared = self.preprocessor.prepare(label, image)?;
        self.set_uploaded_texture(prepared.handle.clone());
        Ok(prepared)
    }

    /// Decode, preprocess and use an encoded image file.
    pub fn upload_image_bytes(&mut self, label: &str, bytes: &[u8]) -> Result<PreparedTexture, TextureError> {
        let prepared = self.preprocessor.prepare_bytes(label, bytes)?;
        self.set_uploaded_texture(prepared.handle.clone());
        Ok(prepared)
    }
}
