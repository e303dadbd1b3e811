//! Garment surface materials, finish presets and the fixed decal material.

use std::collections::HashMap;

use atelier_config::{DecalConfig, MaterialConfig};
use atelier_ipc::Finish;
use glam::Vec2;
use tracing::warn;

use crate::texture::TextureHandle;
use crate::types::Color;

/// Texture maps backing a textured finish
#[derive(Debug, Clone, PartialEq)]
pub struct FinishTextures {
    pub color: TextureHandle,
    pub normal: TextureHandle,
    pub roughness: TextureHandle,
}

/// Lit PBR material applied to garment sub-meshes
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub finish: Finish,
    pub base_color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: Vec2,
    /// None for the plain finish, or when the host never supplied the maps
    pub maps: Option<FinishTextures>,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            finish: Finish::Normal,
            base_color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            normal_scale: Vec2::ONE,
            maps: None,
        }
    }
}

/// Finish maps registered by the host (the engine never loads image files itself)
#[derive(Debug, Clone, Default)]
pub struct FinishLibrary {
    maps: HashMap<Finish, FinishTextures>,
}

impl FinishLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, finish: Finish, textures: FinishTextures) {
        self.maps.insert(finish, textures);
    }

    pub fn get(&self, finish: Finish) -> Option<&FinishTextures> {
        self.maps.get(&finish)
    }
}

/// Current garment color and finish.
///
/// Survives garment reloads; the garment meshes themselves do not.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialState {
    pub color: Color,
    pub finish: Finish,
}

impl MaterialState {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            finish: Finish::Normal,
        }
    }

    /// Build the surface material for the current finish with the current color on top.
    pub fn surface_material(&self, presets: &MaterialConfig, library: &FinishLibrary) -> SurfaceMaterial {
        let preset = presets.preset(self.finish);

        let maps = if preset.maps.is_some() {
            let textures = library.get(self.finish).cloned();
            if textures.is_none() {
                warn!(
                    "No maps registered for {:?} finish, applying its constants only",
                    self.finish
                );
            }
            textures
        } else {
            None
        };

        SurfaceMaterial {
            finish: self.finish,
            base_color: self.color,
            roughness: preset.roughness,
            metalness: preset.metalness,
            normal_scale: Vec2::from_array(preset.normal_scale),
            maps,
        }
    }
}

/// Material of a placed decal.
///
/// Always unlit, transparent, double-sided, depth-tested without depth writes, and
/// pulled toward the camera by a negative polygon offset so it never z-fights with
/// the garment surface it lies on. Only the texture, opacity and offset strength
/// vary, and they are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct DecalMaterial {
    texture: TextureHandle,
    opacity: f32,
    polygon_offset_factor: f32,
}

impl DecalMaterial {
    pub fn new(texture: TextureHandle, config: &DecalConfig) -> Self {
        Self {
            texture,
            opacity: config.opacity,
            polygon_offset_factor: config.polygon_offset_factor,
        }
    }

    /// The image this decal was stamped with
    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn polygon_offset_factor(&self) -> f32 {
        self.polygon_offset_factor
    }

    pub fn unlit(&self) -> bool {
        true
    }

    pub fn transparent(&self) -> bool {
        true
    }

    pub fn double_sided(&self) -> bool {
        true
    }

    pub fn depth_test(&self) -> bool {
        true
    }

    pub fn depth_write(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps(label: &str) -> FinishTextures {
        FinishTextures {
            color: TextureHandle::new(format!("{label}_color"), 8, 8),
            normal: TextureHandle::new(format!("{label}_normal"), 8, 8),
            roughness: TextureHandle::new(format!("{label}_roughness"), 8, 8),
        }
    }

    #[test]
    fn test_normal_finish_is_plain() {
        let state = MaterialState::new(Color::RED);
        let material = state.surface_material(&MaterialConfig::default(), &FinishLibrary::new());
        assert_eq!(material.finish, Finish::Normal);
        assert_eq!(material.base_color, Color::RED);
        assert_eq!(material.roughness, 1.0);
        assert_eq!(material.metalness, 0.0);
        assert!(material.maps.is_none());
    }

    #[test]
    fn test_leather_uses_registered_maps() {
        let mut library = FinishLibrary::new();
        let leather = maps("leather");
        library.register(Finish::Leather, leather.clone());

        let state = MaterialState {
            color: Color::rgb(0.2, 0.1, 0.0),
            finish: Finish::Leather,
        };
        let material = state.surface_material(&MaterialConfig::default(), &library);
        assert_eq!(material.roughness, 0.8);
        assert_eq!(material.metalness, 0.2);
        assert_eq!(material.maps, Some(leather));
        assert_eq!(material.base_color, Color::rgb(0.2, 0.1, 0.0));
    }

    #[test]
    fn test_missing_maps_keep_constants() {
        let state = MaterialState {
            color: Color::RED,
            finish: Finish::Cotton,
        };
        let material = state.surface_material(&MaterialConfig::default(), &FinishLibrary::new());
        assert_eq!(material.finish, Finish::Cotton);
        assert!(material.maps.is_none());
    }

    #[test]
    fn test_decal_material_flags() {
        let material = DecalMaterial::new(TextureHandle::new("logo", 16, 16), &DecalConfig::default());
        assert!(material.unlit());
        assert!(material.transparent());
        assert!(material.double_sided());
        assert!(material.depth_test());
        assert!(!material.depth_write());
        assert!(material.polygon_offset_factor() < 0.0);
        assert_eq!(material.opacity(), 1.0);
    }
}
