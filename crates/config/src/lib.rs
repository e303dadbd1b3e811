//! Shared configuration for Atelier
//!
//! This crate provides the single source of truth for the tunable constants of
//! the garment engine: decal projection size, finish presets, image contrast,
//! pose rotation limits, the default viewer camera and the garment catalog.

use atelier_ipc::{Finish, GarmentKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default decal half-extent along each local axis (world units)
pub const DEFAULT_DECAL_HALF_EXTENT: f32 = 0.125;

/// Half-extent of a 0.125-wide projection box, the size the web viewers stamp
pub const COMPACT_DECAL_HALF_EXTENT: f32 = 0.0625;

/// Larger decal half-extent used by the pullover viewer
pub const WIDE_DECAL_HALF_EXTENT: f32 = 0.15;

/// Polygon offset factor pulling decals toward the camera
pub const DEFAULT_POLYGON_OFFSET_FACTOR: f32 = -4.0;

/// Contrast applied to uploaded images (0-255 scale)
pub const DEFAULT_CONTRAST: f32 = 50.0;

/// Garment color before the user picks one
pub const DEFAULT_COLOR: &str = "#ff0000";

/// Garment rotation per dragged pixel (radians)
pub const DEFAULT_ROTATION_SPEED: f32 = 0.005;

/// Maximum garment rotation either side of the front view (radians)
pub const DEFAULT_ROTATION_LIMIT: f32 = std::f32::consts::FRAC_PI_4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct EngineConfig {
    pub decal: DecalConfig,
    pub materials: MaterialConfig,
    pub image: ImageConfig,
    pub rotation: RotationConfig,
    pub camera: CameraConfig,
    pub garments: GarmentCatalog,
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .decal
            .half_extents
            .iter()
            .any(|e| !e.is_finite() || *e <= 0.0)
        {
            return Err(ConfigError::Invalid {
                field: "decal.half_extents",
                reason: format!("{:?} must be finite and positive", self.decal.half_extents),
            });
        }
        if self.decal.polygon_offset_factor > 0.0 {
            return Err(ConfigError::Invalid {
                field: "decal.polygon_offset_factor",
                reason: "must not push decals behind the garment".to_string(),
            });
        }
        if !(-255.0..=255.0).contains(&self.image.contrast) {
            return Err(ConfigError::Invalid {
                field: "image.contrast",
                reason: format!("{} is outside -255..=255", self.image.contrast),
            });
        }
        if self.rotation.limit < 0.0 {
            return Err(ConfigError::Invalid {
                field: "rotation.limit",
                reason: "must be non-negative".to_string(),
            });
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid {
                field: "camera",
                reason: format!("near {} / far {}", self.camera.near, self.camera.far),
            });
        }
        if !(0.0..180.0).contains(&self.camera.fov_y_degrees) || self.camera.fov_y_degrees == 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.fov_y_degrees",
                reason: format!("{} is outside (0, 180)", self.camera.fov_y_degrees),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Decals
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecalConfig {
    /// Projection box half-extents along the decal's local X/Y/Z
    pub half_extents: [f32; 3],
    /// Depth bias factor for decal materials
    pub polygon_offset_factor: f32,
    /// Decal material opacity
    pub opacity: f32,
}

impl Default for DecalConfig {
    fn default() -> Self {
        Self {
            half_extents: [DEFAULT_DECAL_HALF_EXTENT; 3],
            polygon_offset_factor: DEFAULT_POLYGON_OFFSET_FACTOR,
            opacity: 1.0,
        }
    }
}

impl DecalConfig {
    /// Uniform cube of the given half-extent
    pub fn uniform(half_extent: f32) -> Self {
        Self {
            half_extents: [half_extent; 3],
            ..Self::default()
        }
    }

    /// Decals at the size of the web viewers' 0.125 box
    pub fn compact() -> Self {
        Self::uniform(COMPACT_DECAL_HALF_EXTENT)
    }
}

// ============================================================================
// Materials
// ============================================================================

/// Texture map triplet backing a textured finish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishMaps {
    pub color: String,
    pub normal: String,
    pub roughness: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishPreset {
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: [f32; 2],
    /// None for the plain finish
    pub maps: Option<FinishMaps>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub default_color: String,
    /// Reapply the active finish after a garment reload (color is always reapplied)
    pub restore_finish_on_reload: bool,
    pub normal: FinishPreset,
    pub cotton: FinishPreset,
    pub leather: FinishPreset,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR.to_string(),
            restore_finish_on_reload: false,
            normal: FinishPreset {
                roughness: 1.0,
                metalness: 0.0,
                normal_scale: [1.0, 1.0],
                maps: None,
            },
            cotton: FinishPreset {
                roughness: 1.0,
                metalness: 0.0,
                normal_scale: [1.0, 1.0],
                maps: Some(FinishMaps {
                    color: "/textures/fabric/Fabric018_4K-JPG_Color.jpg".to_string(),
                    normal: "/textures/fabric/Fabric018_4K-JPG_NormalGL.jpg".to_string(),
                    roughness: "/textures/fabric/Fabric018_4K-JPG_Roughness.jpg".to_string(),
                }),
            },
            leather: FinishPreset {
                roughness: 0.8,
                metalness: 0.2,
                normal_scale: [1.0, 1.0],
                maps: Some(FinishMaps {
                    color: "/textures/leather/Leather037_2K-JPG_Color.jpg".to_string(),
                    normal: "/textures/leather/Leather037_2K-JPG_NormalGL.jpg".to_string(),
                    roughness: "/textures/leather/Leather037_2K-JPG_Roughness.jpg".to_string(),
                }),
            },
        }
    }
}

impl MaterialConfig {
    pub fn preset(&self, finish: Finish) -> &FinishPreset {
        match finish {
            Finish::Normal => &self.normal,
            Finish::Cotton => &self.cotton,
            Finish::Leather => &self.leather,
        }
    }
}

// ============================================================================
// Image, rotation, camera
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Linear contrast on the 0-255 scale
    pub contrast: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            contrast: DEFAULT_CONTRAST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Radians per dragged pixel
    pub speed: f32,
    /// Symmetric clamp around the front view
    pub limit: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_ROTATION_SPEED,
            limit: DEFAULT_ROTATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 1.6, 2.0],
            target: [0.0, 1.2, 0.0],
        }
    }
}

// ============================================================================
// Garment catalog
// ============================================================================

/// Where a garment model lives and how it is placed when loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentPreset {
    pub kind: GarmentKind,
    pub path: String,
    pub scale: f32,
    pub position: [f32; 3],
    pub rotation_x: f32,
}

impl GarmentPreset {
    pub fn new(kind: GarmentKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            scale: 1.0,
            position: [0.0; 3],
            rotation_x: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarmentCatalog(pub Vec<GarmentPreset>);

impl Default for GarmentCatalog {
    fn default() -> Self {
        Self(vec![
            GarmentPreset::new(GarmentKind::TShirt, "/models/wif.glb"),
            GarmentPreset::new(GarmentKind::Polo, "/models/waf.glb"),
            GarmentPreset::new(GarmentKind::Pullover, "/models/wouf.glb"),
        ])
    }
}

impl GarmentCatalog {
    pub fn get(&self, kind: GarmentKind) -> Option<&GarmentPreset> {
        self.0.iter().find(|preset| preset.kind == kind)
    }
}
