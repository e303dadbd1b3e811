//! Garment loading and replacement

use atelier_ipc::{Finish, GarmentKind};
use tracing::{info, warn};

use crate::garment::{GarmentInstance, GarmentMesh};
use crate::loader::{GarmentLoader, LoadError, LoadRequest, LoadTicket};
use crate::scene::SceneAttachable;
use crate::types::GarmentId;

use super::EngineState;

impl<S: SceneAttachable> EngineState<S> {
    /// Swap in a new garment.
    ///
    /// Decals are detached before the old garment leaves the scene and before the
    /// new one is attached, so no decal is ever shown against the wrong mesh. The
    /// stored color is reapplied; the finish only when configured to survive reloads.
    ///
    /// A garment with inconsistent geometry is refused and the current state kept.
    pub fn replace_garment(&mut self, mut garment: GarmentInstance) -> Result<(), LoadError> {
        garment
            .validate()
            .inspect_err(|e| warn!("Refusing garment from {}: {}", garment.source(), e))?;

        let cleared = self.decals.clear(&mut self.scene);

        if let Some(old) = self.garment.take() {
            self.scene.detach_garment(old.id());
        }

        if self.config.materials.restore_finish_on_reload {
            let material = self
                .materials
                .surface_material(&self.config.materials, &self.finish_library);
            garment.set_material(&material);
        } else {
            self.materials.finish = Finish::Normal;
            garment.set_color(self.materials.color);
        }

        info!(
            "Garment {:?} from {} replaced previous ({} decals cleared)",
            garment.id(),
            garment.source(),
            cleared
        );
        self.scene.attach_garment(&garment);
        self.garment = Some(garment);
        Ok(())
    }

    /// Start a load. Any load started earlier becomes stale.
    pub fn begin_load(&mut self, request: LoadRequest) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
            request,
        }
    }

    /// Complete a load started with [`Self::begin_load`].
    ///
    /// Failed and superseded loads leave the current garment and decals untouched.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<GarmentMesh, LoadError>,
    ) -> Result<GarmentId, LoadError> {
        if ticket.generation != self.load_generation {
            warn!(
                "Dropping result for {} (load {} superseded by {})",
                ticket.request.path, ticket.generation, self.load_generation
            );
            return Err(LoadError::Superseded);
        }

        let mesh = result.inspect_err(|e| warn!("Failed to load {}: {}", ticket.request.path, e))?;
        mesh.validate(&ticket.request.path)
            .inspect_err(|e| warn!("Rejected {}: {}", ticket.request.path, e))?;

        let id = GarmentId(self.next_garment_id);
        self.next_garment_id += 1;

        let LoadRequest { path, root, .. } = ticket.request;
        self.replace_garment(GarmentInstance::new(id, path, mesh, root))?;
        Ok(id)
    }

    /// Load a garment through `loader` and swap it in.
    pub async fn load_garment<L: GarmentLoader>(
        &mut self,
        loader: &L,
        request: LoadRequest,
    ) -> Result<GarmentId, LoadError> {
        let ticket = self.begin_load(request);
        let result = loader.load_garment(&ticket.request.path).await;
        self.finish_load(ticket, result)
    }

    /// Load the catalog preset for `kind`.
    pub async fn switch_garment<L: GarmentLoader>(
        &mut self,
        loader: &L,
        kind: GarmentKind,
    ) -> Result<GarmentId, LoadError> {
        let preset = self
            .config
            .garments
            .get(kind)
            .ok_or(LoadError::UnknownGarment(kind))?;
        let request = LoadRequest::from(preset);
        self.load_garment(loader, request).await
    }
}
