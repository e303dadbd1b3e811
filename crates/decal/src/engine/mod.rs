//! Engine state
//!
//! [`EngineState`] owns everything the customizer mutates: the live garment,
//! the placed decals, the uploaded image, and the current color and finish.
//! It is driven from a single event-dispatch context:
//! - Pointer clicks go through `click` (pick, orient, build, attach)
//! - Garment loads go through `load_garment` / `finish_load`
//! - Color and finish changes go through `set_color` / `set_finish`
//!
//! The engine does not render. Structural changes are reported to the host's
//! scene through [`SceneAttachable`].

mod dispatch;
mod lifecycle;
mod loading;
mod surface;

use atelier_config::{ConfigError, EngineConfig};
use atelier_ipc::ViewportRect;

use crate::camera::Camera;
use crate::decal_set::DecalSet;
use crate::garment::GarmentInstance;
use crate::material::{FinishLibrary, MaterialState};
use crate::scene::{SceneAttachable, SceneGraph};
use crate::texture::{ImagePreprocessor, TextureHandle};
use crate::types::Color;

/// Single owner of the customizer state
pub struct EngineState<S: SceneAttachable = SceneGraph> {
    pub(crate) config: EngineConfig,
    /// Host scene receiving attach/detach calls
    pub(crate) scene: S,
    /// Live garment (None before the first successful load)
    pub(crate) garment: Option<GarmentInstance>,
    pub(crate) decals: DecalSet,
    /// Image new decals are stamped with
    pub(crate) texture: Option<TextureHandle>,
    pub(crate) materials: MaterialState,
    pub(crate) finish_library: FinishLibrary,
    pub(crate) preprocessor: ImagePreprocessor,
    pub(crate) camera: Camera,
    pub(crate) viewport: ViewportRect,
    pub(crate) next_garment_id: u64,
    /// Generation of the most recent load request
    pub(crate) load_generation: u64,
}

impl EngineState<SceneGraph> {
    /// Create a headless engine
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_scene(config, SceneGraph::new())
    }
}

impl<S: SceneAttachable> EngineState<S> {
    /// Create an engine reporting to `scene`
    pub fn with_scene(config: EngineConfig, scene: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let color = Color::from_hex(&config.materials.default_color).map_err(|e| ConfigError::Invalid {
            field: "materials.default_color",
            reason: e.to_string(),
        })?;

        let viewport = ViewportRect::default();
        Ok(Self {
            camera: Camera::from_config(&config.camera, viewport.aspect()),
            preprocessor: ImagePreprocessor::from_config(&config.image),
            materials: MaterialState::new(color),
            config,
            scene,
            garment: None,
            decals: DecalSet::new(),
            texture: None,
            finish_library: FinishLibrary::new(),
            viewport,
            next_garment_id: 1,
            load_generation: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn garment(&self) -> Option<&GarmentInstance> {
        self.garment.as_ref()
    }

    pub fn decals(&self) -> &DecalSet {
        &self.decals
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    pub fn materials(&self) -> &MaterialState {
        &self.materials
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn viewport(&self) -> &ViewportRect {
        &self.viewport
    }

    /// Track the viewer rectangle; the camera aspect follows it.
    pub fn set_viewport(&mut self, viewport: ViewportRect) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }
}
