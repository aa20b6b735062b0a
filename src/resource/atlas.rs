//! The atlas texture together with its allocator and pixel writers.

use truetype_atlas_core::blit::{self, Blitter, Fill, Rect, SourceMode};
use truetype_atlas_core::{GlyphInfo, PackError, ShelfPacker};

use crate::error::FontError;
use crate::texture::Texture;

/// Rasterizer output for one glyph, already fitted to its layout box.
pub(super) enum Raster {
    /// 8-bit coverage, `pixel_width * pixel_height` bytes.
    Ink(Vec<u8>),
    /// Nothing to draw (whitespace).
    Blank,
}

pub(super) struct Atlas {
    texture: Box<dyn Texture>,
    packer: ShelfPacker,
    /// Writer for rasterized glyphs.
    glyphs: Blitter,
    /// Writer for the cursor and selection markers.
    markers: Blitter,
}

impl Atlas {
    pub(super) fn new(texture: Box<dyn Texture>, antialias: bool) -> Self {
        let format = texture.format();
        let packer = ShelfPacker::new(texture.width(), texture.height());
        Self {
            texture,
            packer,
            glyphs: Blitter::new(format, SourceMode::for_glyphs(antialias)),
            markers: Blitter::new(format, SourceMode::Synthetic),
        }
    }

    pub(super) fn width(&self) -> u32 {
        self.texture.width()
    }

    pub(super) fn height(&self) -> u32 {
        self.texture.height()
    }

    pub(super) fn texture(&self) -> &dyn Texture {
        self.texture.as_ref()
    }

    pub(super) fn texture_mut(&mut self) -> &mut dyn Texture {
        self.texture.as_mut()
    }

    pub(super) fn allocate(&mut self, width: u32, height: u32) -> Result<(u32, u32), PackError> {
        self.packer.allocate(width, height)
    }

    /// Fill the whole texture with transparent white. Texture must be locked.
    pub(super) fn clear(&mut self) -> Result<(), FontError> {
        let format = self.texture.format();
        let buffer = self.texture.buffer_mut().ok_or(FontError::NotLocked)?;
        blit::clear(format, buffer);
        Ok(())
    }

    /// Copy a glyph's coverage to `(x, y)`.
    pub(super) fn draw_coverage(
        &mut self,
        x: u32,
        y: u32,
        info: &GlyphInfo,
        coverage: &[u8],
    ) -> Result<(), FontError> {
        let rect = glyph_rect(x, y, info);
        let (w, h) = (self.texture.width(), self.texture.height());
        let dest = self.texture.buffer_mut().ok_or(FontError::NotLocked)?;
        self.glyphs.blit(dest, w, h, rect, &Fill::WHITE, coverage)?;
        Ok(())
    }

    /// Fill a synthetic glyph's box with striped pixels of `alpha`.
    pub(super) fn draw_marker(
        &mut self,
        x: u32,
        y: u32,
        info: &GlyphInfo,
        alpha: u8,
    ) -> Result<(), FontError> {
        let rect = glyph_rect(x, y, info);
        let (w, h) = (self.texture.width(), self.texture.height());
        let dest = self.texture.buffer_mut().ok_or(FontError::NotLocked)?;
        self.markers.blit(dest, w, h, rect, &Fill::striped(alpha), &[])?;
        Ok(())
    }
}

fn glyph_rect(x: u32, y: u32, info: &GlyphInfo) -> Rect {
    Rect {
        x,
        y,
        w: info.pixel_width(),
        h: info.pixel_height(),
    }
}
