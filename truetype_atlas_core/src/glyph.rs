//! Per-glyph layout record stored by a font resource.

use crate::code_point::CodePoint;

/// Glyph index within a face, or beyond the face's range for synthetic glyphs.
pub type GlyphIndex = u32;

/// Normalized texture coordinates of a glyph inside the atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Metrics and atlas placement for one glyph, in pixels.
///
/// `bearing_y` is measured downward from the top of the line (font ascent),
/// not upward from the baseline, so a renderer can place the quad at
/// `pen_y + bearing_y` directly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphInfo {
    /// Code point the glyph was first created for.
    pub code_point: CodePoint,
    pub width: f32,
    pub height: f32,
    /// Pen advance after drawing, excluding `bearing_x`.
    pub advance: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub uv_rect: UvRect,
}

impl GlyphInfo {
    pub fn new(
        code_point: CodePoint,
        width: f32,
        height: f32,
        advance: f32,
        bearing_x: f32,
        bearing_y: f32,
    ) -> Self {
        Self {
            code_point,
            width,
            height,
            advance,
            bearing_x,
            bearing_y,
            uv_rect: UvRect::default(),
        }
    }

    /// Width in whole texels occupied in the atlas.
    pub fn pixel_width(&self) -> u32 {
        ceil_px(self.width)
    }

    /// Height in whole texels occupied in the atlas.
    pub fn pixel_height(&self) -> u32 {
        ceil_px(self.height)
    }

    /// Record the glyph's atlas position as normalized UV coordinates.
    pub fn place(&mut self, x: u32, y: u32, tex_width: u32, tex_height: u32) {
        let tw = tex_width as f32;
        let th = tex_height as f32;
        self.uv_rect = UvRect {
            left: x as f32 / tw,
            top: y as f32 / th,
            right: (x as f32 + self.width) / tw,
            bottom: (y as f32 + self.height) / th,
        };
    }

    /// Collapse the glyph horizontally after it has been placed.
    ///
    /// Used for selection markers, which are stretched by the renderer;
    /// sampling a zero-width UV span avoids seams between adjacent quads.
    pub fn collapse_width(&mut self) {
        self.width = 0.0;
        self.uv_rect.right = self.uv_rect.left;
    }
}

/// Round a non-negative pixel measure up to whole pixels. Negative and NaN
/// inputs yield zero.
pub fn ceil_px(v: f32) -> u32 {
    if v > 0.0 { v.ceil() as u32 } else { 0 }
}
