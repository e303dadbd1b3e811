//! Color, finish and pose of the live garment.
//!
//! None of these touch decals: decals are separate objects parented under the
//! garment, so they keep their own material and follow the garment pose.

use atelier_ipc::Finish;
use tracing::{debug, info};

use crate::material::FinishTextures;
use crate::scene::SceneAttachable;
use crate::types::{Color, ColorParseError};

use super::EngineState;

impl<S: SceneAttachable> EngineState<S> {
    /// Store the garment color and apply it to every garment surface.
    pub fn set_color(&mut self, color: Color) {
        self.materials.color = color;
        if let Some(garment) = self.garment.as_mut() {
            garment.set_color(color);
            self.scene.refresh_garment(garment);
        }
        debug!("Garment color set to {}", color.to_hex());
    }

    /// Parse and apply a `#rrggbb` color from the UI.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<Color, ColorParseError> {
        let color = Color::from_hex(hex)?;
        self.set_color(color);
        Ok(color)
    }

    /// Replace every garment material with the finish preset, current color on top.
    pub fn set_finish(&mut self, finish: Finish) {
        self.materials.finish = finish;
        self.apply_finish();
        info!("Garment finish set to {:?}", finish);
    }

    /// Provide the texture maps of a textured finish.
    ///
    /// Reapplied immediately when that finish is already showing.
    pub fn register_finish_maps(&mut self, finish: Finish, textures: FinishTextures) {
        self.finish_library.register(finish, textures);
        if self.materials.finish == finish {
            self.apply_finish();
        }
    }

    /// Rotate the garment by a horizontal drag distance in pixels.
    ///
    /// Returns the new Y rotation, or `None` when nothing is loaded.
    pub fn rotate_garment(&mut self, delta_px: f32) -> Option<f32> {
        let garment = self.garment.as_mut()?;
        let angle = garment.rotate_y(delta_px * self.config.rotation.speed, self.config.rotation.limit);
        self.scene.refresh_garment(garment);
        Some(angle)
    }

    pub(crate) fn apply_finish(&mut self) {
        let material = self
            .materials
            .surface_material(&self.config.materials, &self.finish_library);
        if let Some(garment) = self.garment.as_mut() {
            garment.set_material(&material);
            self.scene.refresh_garment(garment);
        }
    }
}
