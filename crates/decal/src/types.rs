use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of one loaded garment. Never reused within an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GarmentId(pub u64);

/// Identity of one placed decal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecalId(pub u64);

/// Index of a sub-mesh within its garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubMeshId(pub usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// Opaque RGB color, components in 0..=1 (sRGB encoded, as picked in the UI)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(text.to_string());
        let digits = text.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        let (r, g, b) = match digits.len() {
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            3 => {
                // #abc expands to #aabbcc
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                (r * 17, g * 17, b * 17)
            }
            _ => return Err(invalid()),
        };

        Ok(Self::from_rgb8([r, g, b]))
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::rgb(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Result of casting a pointer ray against the garment.
///
/// Ephemeral: produced by a pick and consumed by decal placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Garment the ray was cast against
    pub garment: GarmentId,
    /// Sub-mesh that was hit
    pub sub_mesh: SubMeshId,
    /// Triangle index within the sub-mesh
    pub face_index: u32,
    /// World-space intersection point
    pub point: Vec3,
    /// World-space unit face normal
    pub normal: Vec3,
    /// Ray parameter of the hit
    pub distance: f32,
    /// Barycentric weights (w0, w1, w2) of the hit within the triangle
    pub barycentric: Vec3,
    /// Interpolated mesh UV, if the mesh has UVs
    pub uv: Option<Vec2>,
}

/// Decal patch vertex laid out for GPU upload.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct DecalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}
