//! Texture handles and uploaded-image preprocessing.
//!
//! The engine never looks at pixels once an image is prepared: decals and
//! finishes only hold a [`TextureHandle`], and the host renderer receives the
//! prepared [`image::RgbaImage`] alongside it for upload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct TextureInfo {
    id: TextureId,
    label: String,
    width: u32,
    height: u32,
}

/// Cheap, immutable reference to a texture owned by the host renderer.
///
/// Cloning shares the same texture; a new upload always yields a new handle, so
/// anything holding an older handle keeps rendering the older image.
#[derive(Debug, Clone)]
pub struct TextureHandle(Arc<TextureInfo>);

impl TextureHandle {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self(Arc::new(TextureInfo {
            id: TextureId::next(),
            label: label.into(),
            width,
            height,
        }))
    }

    pub fn id(&self) -> TextureId {
        self.0.id
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn size(&self) -> (u32, u32) {
        (self.0.width, self.0.height)
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TextureHandle {}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,
}

/// Image ready for upload, paired with the handle decals will reference
#[derive(Debug, Clone)]
pub struct PreparedTexture {
    pub handle: TextureHandle,
    pub image: RgbaImage,
}

/// Linear contrast factor for a contrast value on the 0-255 scale.
pub fn contrast_factor(contrast: f32) -> f32 {
    (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast))
}

/// Apply a linear contrast adjustment around mid-grey to RGB, keeping alpha.
///
/// Results are clamped to the channel range and rounded to the nearest value.
pub fn adjust_contrast(image: &mut RgbaImage, contrast: f32) {
    let factor = contrast_factor(contrast);
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            let adjusted = factor * (*channel as f32 - 128.0) + 128.0;
            *channel = adjusted.clamp(0.0, 255.0).round() as u8;
        }
    }
}

/// Turns user images into stamping textures.
///
/// Applies the contrast boost that compensates for scene lighting, then mirrors
/// the image horizontally: the decal frame's X axis runs opposite to the viewer's
/// right after the 180° orientation correction.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    contrast: f32,
}

impl ImagePreprocessor {
    pub fn new(contrast: f32) -> Self {
        Self { contrast }
    }

    pub fn from_config(config: &atelier_config::ImageConfig) -> Self {
        Self::new(config.contrast)
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Prepare an already decoded image.
    pub fn prepare(&self, label: impl Into<String>, mut image: RgbaImage) -> Result<PreparedTexture, TextureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty);
        }

        adjust_contrast(&mut image, self.contrast);
        image::imageops::flip_horizontal_in_place(&mut image);

        let handle = TextureHandle::new(label, image.width(), image.height());
        debug!(
            "Prepared texture {:?} ({}x{}, contrast {})",
            handle.id(),
            image.width(),
            image.height(),
            self.contrast
        );
        Ok(PreparedTexture { handle, image })
    }

    /// Decode an encoded image file (PNG, JPEG, ...) and prepare it.
    pub fn prepare_bytes(&self, label: impl Into<String>, bytes: &[u8]) -> Result<PreparedTexture, TextureError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.prepare(label, image)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(atelier_config::DEFAULT_CONTRAST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_contrast_factor() {
        assert!((contrast_factor(0.0) - 1.0).abs() < 1e-6);
        // 259 * 305 / (255 * 209)
        assert!((contrast_factor(50.0) - 1.482_222).abs() < 1e-4);
    }

    #[test]
    fn test_adjust_contrast_clamps_and_keeps_alpha() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([255, 128, 10, 77]));
        adjust_contrast(&mut image, 50.0);
        let Rgba([r, g, b, a]) = *image.get_pixel(0, 0);
        assert_eq!(r, 255);
        assert_eq!(g, 128);
        assert_eq!(b, 0);
        assert_eq!(a, 77);
    }

    #[test]
    fn test_adjust_contrast_rounds_to_nearest() {
        // 1.482222 * 72 + 128 = 234.72
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([200, 60, 150, 255]));
        adjust_contrast(&mut image, 50.0);
        assert_eq!(image.get_pixel(0, 0).0, [235, 27, 161, 255]);
    }

    #[test]
    fn test_prepare_mirrors_horizontally() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([128, 128, 128, 255]));
        image.put_pixel(1, 0, Rgba([255, 255, 255, 255]));

        let prepared = ImagePreprocessor::new(0.0).prepare("logo", image).unwrap();
        assert_eq!(prepared.image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(prepared.image.get_pixel(1, 0).0, [128, 128, 128, 255]);
        assert_eq!(prepared.handle.size(), (2, 1));
    }

    #[test]
    fn test_prepare_rejects_empty() {
        let result = ImagePreprocessor::default().prepare("empty", RgbaImage::new(0, 0));
        assert!(matches!(result, Err(TextureError::Empty)));
    }

    #[test]
    fn test_prepare_bytes_rejects_garbage() {
        let result = ImagePreprocessor::default().prepare_bytes("junk", b"not an image");
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_handles_are_distinct() {
        let a = TextureHandle::new("a", 4, 4);
        let b = TextureHandle::new("a", 4, 4);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
