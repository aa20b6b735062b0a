//! Rasterizer capability.
//!
//! A [`RasterBackend`] turns font bytes into a [`RasterFace`]. Faces are
//! stateful: the active character size belongs to the face, so every caller
//! must set it before loading glyphs.

pub mod swash;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use truetype_atlas_core::blit::expand_mono;
use truetype_atlas_core::code_point::CodePoint;
use truetype_atlas_core::{GlyphIndex, Os2Metrics, RawGlyphMetrics, SizeMetrics};

use crate::error::FontError;

pub use self::swash::SwashBackend;

/// How a glyph is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Layout metrics only, no bitmap.
    Default,
    /// Metrics and a bitmap. `monochrome` asks for 1-bit output.
    Render { monochrome: bool },
}

/// A rendered glyph bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphBitmap {
    /// One byte of coverage per pixel, rows tightly packed.
    Gray { width: u32, height: u32, data: Vec<u8> },
    /// One bit per pixel, most significant bit first, `pitch` bytes per row.
    Mono {
        width: u32,
        height: u32,
        pitch: usize,
        data: Vec<u8>,
    },
}

impl GlyphBitmap {
    pub fn width(&self) -> u32 {
        match self {
            Self::Gray { width, .. } | Self::Mono { width, .. } => *width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Gray { height, .. } | Self::Mono { height, .. } => *height,
        }
    }

    /// Convert to 8-bit coverage. Set mono pixels become `0xFF`.
    pub fn into_gray(self) -> Vec<u8> {
        match self {
            Self::Gray { data, .. } => data,
            Self::Mono {
                width,
                height,
                pitch,
                data,
            } => expand_mono(&data, width, height, pitch),
        }
    }
}

/// Result of loading one glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGlyph {
    pub metrics: RawGlyphMetrics,
    /// Present for [`LoadMode::Render`] on glyphs with ink.
    pub bitmap: Option<GlyphBitmap>,
}

/// One loaded font face.
pub trait RasterFace: Send {
    /// Whether the face has outlines. Bitmap-only faces are not.
    fn is_scalable(&self) -> bool;

    /// Number of glyphs in the face. Indices at or above it are free for
    /// synthetic glyphs.
    fn glyph_count(&self) -> u32;

    /// Glyph for a code point, 0 when the face lacks it.
    fn glyph_index(&self, code_point: CodePoint) -> GlyphIndex;

    /// Set the active size from a 26.6 point size at `resolution` DPI.
    fn set_char_size(&mut self, size: i64, resolution: u32) -> Result<(), FontError>;

    /// Make a fixed bitmap strike active. For faces that are not scalable.
    fn select_bitmap_strike(&mut self, strike: usize) -> Result<(), FontError>;

    fn size_metrics(&self) -> SizeMetrics;

    fn os2_metrics(&self) -> Option<Os2Metrics>;

    /// Load a glyph at the active size. `None` when the glyph cannot be
    /// loaded.
    fn load_glyph(&mut self, glyph: GlyphIndex, mode: LoadMode) -> Option<LoadedGlyph>;
}

/// Creates faces from font file bytes.
pub trait RasterBackend {
    fn load_face(&self, data: Arc<[u8]>) -> Result<Box<dyn RasterFace>, FontError>;
}
