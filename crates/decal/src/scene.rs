//! Scene graph attachment.
//!
//! The engine never renders; it reports structural changes to whatever owns the
//! render scene through [`SceneAttachable`]. Every attach and detach of a decal
//! goes through [`crate::DecalSet`], so the set and the scene never disagree.

use std::collections::HashMap;

use tracing::warn;

use crate::decal_set::Decal;
use crate::garment::GarmentInstance;
use crate::types::{DecalId, GarmentId};

/// Structural operations on the host's render scene
pub trait SceneAttachable {
    /// Add the garment as the scene's garment root
    fn attach_garment(&mut self, garment: &GarmentInstance);

    /// Remove the garment root. Called only after all of its decals were detached.
    fn detach_garment(&mut self, garment: GarmentId);

    /// Parent a decal patch under `parent`
    fn attach_decal(&mut self, parent: GarmentId, decal: &Decal);

    /// Remove a decal patch from under `parent`
    fn detach_decal(&mut self, parent: GarmentId, decal: DecalId);

    /// Garment materials or pose changed
    fn refresh_garment(&mut self, _garment: &GarmentInstance) {}
}

/// Headless scene graph that records parenting.
///
/// Used by the engine when no renderer is attached, and in tests to check that
/// no decal stays reachable after it was cleared.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    root: Option<GarmentId>,
    children: HashMap<GarmentId, Vec<DecalId>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Garment currently attached as the root
    pub fn root(&self) -> Option<GarmentId> {
        self.root
    }

    pub fn is_attached(&self, garment: GarmentId) -> bool {
        self.root == Some(garment)
    }

    /// Decals parented under `garment`
    pub fn children_of(&self, garment: GarmentId) -> &[DecalId] {
        self.children.get(&garment).map_or(&[], Vec::as_slice)
    }

    /// Decals reachable from the current root
    pub fn reachable_decals(&self) -> Vec<DecalId> {
        self.root
            .map(|root| self.children_of(root).to_vec())
            .unwrap_or_default()
    }

    /// Decals parented anywhere, reachable or not
    pub fn decal_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }
}

impl SceneAttachable for SceneGraph {
    fn attach_garment(&mut self, garment: &GarmentInstance) {
        if let Some(previous) = self.root.replace(garment.id()) {
            warn!("Garment {:?} attached over {:?}", garment.id(), previous);
        }
        self.children.entry(garment.id()).or_default();
    }

    fn detach_garment(&mut self, garment: GarmentId) {
        if self.root == Some(garment) {
            self.root = None;
        }
        if let Some(orphans) = self.children.remove(&garment)
            && !orphans.is_empty()
        {
            warn!("Garment {:?} detached with {} decals still parented", garment, orphans.len());
        }
    }

    fn attach_decal(&mut self, parent: GarmentId, decal: &Decal) {
        self.children.entry(parent).or_default().push(decal.id());
    }

    fn detach_decal(&mut self, parent: GarmentId, decal: DecalId) {
        if let Some(children) = self.children.get_mut(&parent) {
            children.retain(|&id| id != decal);
        }
    }
}
