//! Pixel writers that copy glyph coverage into an atlas buffer.
//!
//! Every combination of destination format and source mode is its own
//! monomorphized copy of `blit_rows`. [`Blitter`] picks one once and calls
//! it through a plain function pointer, so the per-pixel loops carry no
//! format or mode checks.
//!
//! Atlas pixels are luminance + alpha. RGBA destinations store the luminance
//! in all three color channels.

use std::borrow::Cow;

/// Destination texel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit luminance, 8-bit alpha.
    La8,
    /// 8-bit RGBA, written as `L L L A`.
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::La8 => La8::BYTES,
            Self::Rgba8 => Rgba8::BYTES,
        }
    }
}

/// Where a written pixel's luminance and alpha come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceMode {
    /// No source bitmap: luminance alternates between the two [`Fill`]
    /// values per column, alpha is the fill alpha.
    Synthetic,
    /// Alpha from the source, luminance from the fill. Used for thresholded
    /// (non-antialiased) glyphs.
    Coverage,
    /// Luminance and alpha both from the source.
    Antialiased,
}

impl SourceMode {
    /// Mode for glyph bitmaps produced by the rasterizer.
    pub fn for_glyphs(antialias: bool) -> Self {
        if antialias { Self::Antialiased } else { Self::Coverage }
    }

    pub fn reads_source(self) -> bool {
        !matches!(self, Self::Synthetic)
    }
}

/// Constant pixel values used where the source does not supply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Luminance for even and odd columns.
    pub luminance: [u8; 2],
    pub alpha: u8,
}

impl Fill {
    /// Opaque white. Fill for rasterized glyphs.
    pub const WHITE: Self = Self {
        luminance: [0xFF, 0xFF],
        alpha: 0xFF,
    };

    /// Transparent white. Atlas background.
    pub const CLEAR: Self = Self {
        luminance: [0xFF, 0xFF],
        alpha: 0x00,
    };

    /// White/black column stripes with the given alpha, for synthetic glyphs.
    pub fn striped(alpha: u8) -> Self {
        Self {
            luminance: [0xFF, 0x00],
            alpha,
        }
    }
}

/// Destination rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlitError {
    #[error("{w}x{h} at ({x}, {y}) lies outside a {tex_width}x{tex_height} atlas")]
    OutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        tex_width: u32,
        tex_height: u32,
    },
    #[error("atlas buffer holds {actual} bytes, {expected} needed")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("glyph bitmap holds {actual} bytes, {expected} needed")]
    SourceTooShort { expected: usize, actual: usize },
}

// Destination formats.

trait DestPixel {
    const BYTES: usize;
    fn write(px: &mut [u8], luminance: u8, alpha: u8);
}

struct La8;

impl DestPixel for La8 {
    const BYTES: usize = 2;

    #[inline]
    fn write(px: &mut [u8], luminance: u8, alpha: u8) {
        px[0] = luminance;
        px[1] = alpha;
    }
}

struct Rgba8;

impl DestPixel for Rgba8 {
    const BYTES: usize = 4;

    #[inline]
    fn write(px: &mut [u8], luminance: u8, alpha: u8) {
        px[0] = luminance;
        px[1] = luminance;
        px[2] = luminance;
        px[3] = alpha;
    }
}

// Source modes.

trait SourcePixel {
    const READS: bool;
    fn sample(fill: &Fill, column: usize, source: u8) -> (u8, u8);
}

struct Synthetic;

impl SourcePixel for Synthetic {
    const READS: bool = false;

    #[inline]
    fn sample(fill: &Fill, column: usize, _: u8) -> (u8, u8) {
        (fill.luminance[column & 1], fill.alpha)
    }
}

struct Coverage;

impl SourcePixel for Coverage {
    const READS: bool = true;

    #[inline]
    fn sample(fill: &Fill, column: usize, source: u8) -> (u8, u8) {
        (fill.luminance[column & 1], source)
    }
}

struct Antialiased;

impl SourcePixel for Antialiased {
    const READS: bool = true;

    #[inline]
    fn sample(_: &Fill, _: usize, source: u8) -> (u8, u8) {
        (source, source)
    }
}

/// Signature shared by every specialized writer. Arguments are validated by
/// [`Blitter::blit`] before the call.
type BlitFn = fn(dest: &mut [u8], stride: usize, rect: Rect, fill: &Fill, source: &[u8]);

fn blit_rows<D: DestPixel, S: SourcePixel>(
    dest: &mut [u8],
    stride: usize,
    rect: Rect,
    fill: &Fill,
    source: &[u8],
) {
    let (x, y) = (rect.x as usize, rect.y as usize);
    let (w, h) = (rect.w as usize, rect.h as usize);
    let row_bytes = w * D::BYTES;

    for row in 0..h {
        let start = ((y + row) * stride + x) * D::BYTES;
        let dst = dest[start..start + row_bytes].chunks_exact_mut(D::BYTES);
        if S::READS {
            let src = &source[row * w..(row + 1) * w];
            for (column, (px, &s)) in dst.zip(src).enumerate() {
                let (l, a) = S::sample(fill, column, s);
                D::write(px, l, a);
            }
        } else {
            for (column, px) in dst.enumerate() {
                let (l, a) = S::sample(fill, column, 0);
                D::write(px, l, a);
            }
        }
    }
}

/// A pixel writer for one destination format and source mode.
#[derive(Clone, Copy)]
pub struct Blitter {
    format: PixelFormat,
    mode: SourceMode,
    func: BlitFn,
}

impl std::fmt::Debug for Blitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blitter")
            .field("format", &self.format)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Blitter {
    pub fn new(format: PixelFormat, mode: SourceMode) -> Self {
        let func: BlitFn = match (format, mode) {
            (PixelFormat::La8, SourceMode::Synthetic) => blit_rows::<La8, Synthetic>,
            (PixelFormat::La8, SourceMode::Coverage) => blit_rows::<La8, Coverage>,
            (PixelFormat::La8, SourceMode::Antialiased) => blit_rows::<La8, Antialiased>,
            (PixelFormat::Rgba8, SourceMode::Synthetic) => blit_rows::<Rgba8, Synthetic>,
            (PixelFormat::Rgba8, SourceMode::Coverage) => blit_rows::<Rgba8, Coverage>,
            (PixelFormat::Rgba8, SourceMode::Antialiased) => blit_rows::<Rgba8, Antialiased>,
        };
        Self { format, mode, func }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Write `rect.w * rect.h` pixels row-major into `dest` at `rect`.
    ///
    /// `dest` is a `tex_width` × `tex_height` atlas in this blitter's format.
    /// Source-reading modes consume `source` as a tightly packed 8-bit
    /// bitmap of exactly the rectangle's size; synthetic mode ignores it.
    pub fn blit(
        &self,
        dest: &mut [u8],
        tex_width: u32,
        tex_height: u32,
        rect: Rect,
        fill: &Fill,
        source: &[u8],
    ) -> Result<(), BlitError> {
        let fits_x = rect.x.checked_add(rect.w).is_some_and(|r| r <= tex_width);
        let fits_y = rect.y.checked_add(rect.h).is_some_and(|b| b <= tex_height);
        if !fits_x || !fits_y {
            return Err(BlitError::OutOfBounds {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                tex_width,
                tex_height,
            });
        }

        let expected = tex_width as usize * tex_height as usize * self.format.bytes_per_pixel();
        if dest.len() < expected {
            return Err(BlitError::BufferTooShort {
                expected,
                actual: dest.len(),
            });
        }

        if self.mode.reads_source() {
            let expected = rect.w as usize * rect.h as usize;
            if source.len() < expected {
                return Err(BlitError::SourceTooShort {
                    expected,
                    actual: source.len(),
                });
            }
        }

        (self.func)(dest, tex_width as usize, rect, fill, source);
        Ok(())
    }
}

/// Fill a whole atlas buffer with transparent white.
pub fn clear(format: PixelFormat, buffer: &mut [u8]) {
    fn fill<D: DestPixel>(buffer: &mut [u8]) {
        let Fill { luminance, alpha } = Fill::CLEAR;
        for px in buffer.chunks_exact_mut(D::BYTES) {
            D::write(px, luminance[0], alpha);
        }
    }

    match format {
        PixelFormat::La8 => fill::<La8>(buffer),
        PixelFormat::Rgba8 => fill::<Rgba8>(buffer),
    }
}

/// Expand a 1-bit-per-pixel bitmap (most significant bit first, `pitch`
/// bytes per row) to 8 bits per pixel. Set bits become `0xFF`.
pub fn expand_mono(bits: &[u8], width: u32, height: u32, pitch: usize) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let mut out = vec![0u8; w * h];
    for (row, dst) in out.chunks_exact_mut(w.max(1)).take(h).enumerate() {
        let Some(src) = bits.get(row * pitch..) else {
            break;
        };
        for (col, px) in dst.iter_mut().enumerate() {
            let byte = src.get(col / 8).copied().unwrap_or(0);
            if byte & (0x80 >> (col % 8)) != 0 {
                *px = 0xFF;
            }
        }
    }
    out
}

/// Crop or zero-pad an 8-bit bitmap to `width` × `height`, anchored at the
/// top-left.
///
/// Rendered bitmaps can differ by a pixel from the layout metrics the atlas
/// slot was sized for. Returns the input unchanged when the sizes agree.
pub fn fit_bitmap(
    source: &[u8],
    src_width: u32,
    src_height: u32,
    width: u32,
    height: u32,
) -> Cow<'_, [u8]> {
    let needed = width as usize * height as usize;
    if src_width == width && src_height == height && source.len() >= needed {
        return Cow::Borrowed(&source[..needed]);
    }

    let (sw, w) = (src_width as usize, width as usize);
    let copy_w = sw.min(w);
    let copy_h = src_height.min(height) as usize;
    let mut out = vec![0u8; needed];
    for row in 0..copy_h {
        let Some(src) = source.get(row * sw..row * sw + copy_w) else {
            break;
        };
        out[row * w..row * w + copy_w].copy_from_slice(src);
    }
    Cow::Owned(out)
}
