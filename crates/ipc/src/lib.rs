//! IPC message protocol for Atelier
//!
//! Defines all message types exchanged between the garment engine and the UI.

use serde::{Deserialize, Serialize};

/// Messages from the UI to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEngine {
    /// Replace the current garment with a catalog preset
    SwitchGarment { garment: GarmentKind },

    /// Set the garment base color (`#rrggbb`)
    SetColor { color: String },

    /// Swap the surface finish of every garment sub-mesh
    SetFinish { finish: Finish },

    /// Remove every placed decal, keeping the uploaded image
    ClearDecals,

    /// Remove every placed decal and forget the uploaded image
    RemoveImages,

    /// Primary click on the viewer (client pixel coordinates)
    Click { x: f32, y: f32 },

    /// Horizontal drag on the viewer, rotates the garment about Y
    Drag { delta_x: f32 },

    /// Viewer rectangle changed
    ViewportResized(ViewportRect),
}

/// Messages from the engine to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToUi {
    /// A garment finished loading and replaced the previous one
    GarmentLoaded { garment: GarmentKind, sub_meshes: usize },

    /// A garment failed to load; the previous garment is still shown
    LoadFailed { garment: GarmentKind, message: String },

    /// A decal was stamped onto the garment
    DecalApplied { decal_count: usize },

    /// All decals were removed
    DecalsCleared,

    /// The uploaded image was forgotten
    ImageRemoved,

    /// Garment base color changed
    ColorChanged { color: String },

    /// Garment finish changed
    FinishChanged { finish: Finish },

    /// Error notification
    Error { code: String, message: String },
}

// ============================================================================
// Garment Types
// ============================================================================

/// Garment presets offered by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GarmentKind {
    #[default]
    TShirt,
    Polo,
    Pullover,
}

impl GarmentKind {
    pub const ALL: [GarmentKind; 3] = [GarmentKind::TShirt, GarmentKind::Polo, GarmentKind::Pullover];
}

/// Surface finish presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Finish {
    /// Plain color, fully rough, non-metallic
    #[default]
    Normal,
    /// Fabric maps
    Cotton,
    /// Leather maps, slightly metallic
    Leather,
}

// ============================================================================
// Viewport Types
// ============================================================================

/// Bounding rectangle of the viewer element in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Width divided by height, 1.0 for a collapsed rectangle
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1280.0, 720.0)
    }
}

// ============================================================================
// Encoding
// ============================================================================

impl UiToEngine {
    pub fn from_json(text: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl EngineToUi {
    pub fn from_json(text: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}
