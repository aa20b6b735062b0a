//! Rasterizer backed by `swash`.
//!
//! Layout metrics come from the hinted outline, grid-fitted the way
//! TrueType rasterizers report them: bounds expanded to whole pixels and
//! advances rounded. Rendered metrics come from the bitmap placement, which
//! can disagree by a pixel; callers keep the layout metrics.

use std::sync::Arc;

use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use swash::{CacheKey, FontRef, tag_from_bytes};

use truetype_atlas_core::code_point::CodePoint;
use truetype_atlas_core::metrics::from_f26dot6;
use truetype_atlas_core::{GlyphIndex, Os2Metrics, RawGlyphMetrics, SizeMetrics};

use super::{GlyphBitmap, LoadMode, LoadedGlyph, RasterBackend, RasterFace};
use crate::error::FontError;

/// Coverage at or above this is "on" in monochrome output.
const MONO_THRESHOLD: u8 = 0x80;

const OUTLINE_SOURCES: &[Source] = &[Source::Outline];
const BITMAP_SOURCES: &[Source] = &[Source::Bitmap(StrikeWith::BestFit)];

/// Smallest OS/2 table that carries the typo and win metrics.
const OS2_MIN_LEN: usize = 78;

/// Loads faces with `swash`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwashBackend;

impl SwashBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RasterBackend for SwashBackend {
    fn load_face(&self, data: Arc<[u8]>) -> Result<Box<dyn RasterFace>, FontError> {
        let (offset, key) = FontRef::from_index(&data, 0)
            .map(|fr| (fr.offset, fr.key))
            .ok_or_else(|| FontError::BackendInit("not a TrueType/OpenType font".into()))?;
        Ok(Box::new(SwashFace {
            data,
            offset,
            key,
            context: ScaleContext::new(),
            ppem: 0.0,
        }))
    }
}

/// A face plus its active size.
struct SwashFace {
    data: Arc<[u8]>,
    offset: u32,
    key: CacheKey,
    context: ScaleContext,
    /// Active size in pixels per em.
    ppem: f32,
}

/// Build a transient `FontRef` from stored face data.
fn font_ref<'a>(data: &'a [u8], offset: u32, key: CacheKey) -> FontRef<'a> {
    FontRef { data, offset, key }
}

fn px_to_26dot6(px: f32) -> i64 {
    (px * 64.0) as i64
}

fn read_u16(table: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([table[at], table[at + 1]])
}

impl SwashFace {
    fn font(&self) -> FontRef<'_> {
        font_ref(&self.data, self.offset, self.key)
    }

    fn advance(&self, glyph: u16) -> i64 {
        let advance = self.font().glyph_metrics(&[]).scale(self.ppem).advance_width(glyph);
        px_to_26dot6(advance.round())
    }

    /// Grid-fitted metrics of the hinted outline.
    fn outline_metrics(&mut self, glyph: u16) -> Option<RawGlyphMetrics> {
        let advance_x = self.advance(glyph);
        let fr = font_ref(&self.data, self.offset, self.key);
        let mut scaler = self.context.builder(fr).size(self.ppem).hint(true).build();
        let outline = scaler.scale_outline(glyph)?;
        let bounds = outline.bounds();

        if bounds.max.x <= bounds.min.x || bounds.max.y <= bounds.min.y {
            return Some(RawGlyphMetrics {
                advance_x,
                ..RawGlyphMetrics::default()
            });
        }

        let left = bounds.min.x.floor();
        let right = bounds.max.x.ceil();
        let bottom = bounds.min.y.floor();
        let top = bounds.max.y.ceil();
        Some(RawGlyphMetrics {
            width: px_to_26dot6(right - left),
            height: px_to_26dot6(top - bottom),
            hori_bearing_x: px_to_26dot6(left),
            hori_bearing_y: px_to_26dot6(top),
            advance_x,
        })
    }

    fn render(&mut self, glyph: u16, monochrome: bool) -> Option<LoadedGlyph> {
        let advance_x = self.advance(glyph);
        let scalable = self.is_scalable();
        let fr = font_ref(&self.data, self.offset, self.key);
        let mut scaler = self.context.builder(fr).size(self.ppem).hint(true).build();

        let sources = if scalable { OUTLINE_SOURCES } else { BITMAP_SOURCES };
        let image = Render::new(sources).format(Format::Alpha).render(&mut scaler, glyph)?;

        let p = image.placement;
        let metrics = RawGlyphMetrics {
            width: i64::from(p.width) * 64,
            height: i64::from(p.height) * 64,
            hori_bearing_x: i64::from(p.left) * 64,
            hori_bearing_y: i64::from(p.top) * 64,
            advance_x,
        };

        let bitmap = (p.width > 0 && p.height > 0).then(|| {
            if monochrome {
                pack_mono(&image.data, p.width, p.height)
            } else {
                GlyphBitmap::Gray {
                    width: p.width,
                    height: p.height,
                    data: image.data,
                }
            }
        });

        Some(LoadedGlyph { metrics, bitmap })
    }
}

/// Threshold 8-bit coverage into a 1-bit bitmap.
fn pack_mono(coverage: &[u8], width: u32, height: u32) -> GlyphBitmap {
    let w = width as usize;
    let pitch = w.div_ceil(8);
    let mut data = vec![0u8; pitch * height as usize];
    for (row, src) in coverage.chunks_exact(w).take(height as usize).enumerate() {
        for (col, &c) in src.iter().enumerate() {
            if c >= MONO_THRESHOLD {
                data[row * pitch + col / 8] |= 0x80 >> (col % 8);
            }
        }
    }
    GlyphBitmap::Mono {
        width,
        height,
        pitch,
        data,
    }
}

impl RasterFace for SwashFace {
    fn is_scalable(&self) -> bool {
        let fr = self.font();
        [b"glyf", b"CFF ", b"CFF2"]
            .iter()
            .any(|tag| fr.table(tag_from_bytes(tag)).is_some())
    }

    fn glyph_count(&self) -> u32 {
        u32::from(self.font().metrics(&[]).glyph_count)
    }

    fn glyph_index(&self, code_point: CodePoint) -> GlyphIndex {
        GlyphIndex::from(self.font().charmap().map(code_point))
    }

    fn set_char_size(&mut self, size: i64, resolution: u32) -> Result<(), FontError> {
        let ppem = from_f26dot6(size) * resolution as f32 / 72.0;
        if !ppem.is_finite() || ppem <= 0.0 {
            return Err(FontError::BackendInit(format!(
                "invalid character size {} at {resolution} dpi",
                from_f26dot6(size)
            )));
        }
        self.ppem = ppem;
        Ok(())
    }

    fn select_bitmap_strike(&mut self, strike: usize) -> Result<(), FontError> {
        let ppem = self
            .font()
            .alpha_strikes()
            .nth(strike)
            .map(|s| s.ppem())
            .ok_or_else(|| FontError::BackendInit(format!("face has no bitmap strike {strike}")))?;
        self.ppem = f32::from(ppem);
        Ok(())
    }

    fn size_metrics(&self) -> SizeMetrics {
        let m = self.font().metrics(&[]).scale(self.ppem);
        SizeMetrics {
            ascender: px_to_26dot6(m.ascent.ceil()),
            descender: -px_to_26dot6(m.descent.abs().ceil()),
            y_ppem: self.ppem.round() as u32,
        }
    }

    fn os2_metrics(&self) -> Option<Os2Metrics> {
        let fr = self.font();
        let table = fr.table(tag_from_bytes(b"OS/2"))?;
        if table.len() < OS2_MIN_LEN {
            return None;
        }
        Some(Os2Metrics {
            units_per_em: fr.metrics(&[]).units_per_em,
            typo_ascender: read_u16(table, 68) as i16,
            typo_descender: read_u16(table, 70) as i16,
            win_ascent: read_u16(table, 74),
            win_descent: read_u16(table, 76),
        })
    }

    fn load_glyph(&mut self, glyph: GlyphIndex, mode: LoadMode) -> Option<LoadedGlyph> {
        let glyph = u16::try_from(glyph).ok()?;
        if self.ppem <= 0.0 {
            return None;
        }
        match mode {
            LoadMode::Default if self.is_scalable() => {
                let metrics = self.outline_metrics(glyph)?;
                Some(LoadedGlyph {
                    metrics,
                    bitmap: None,
                })
            }
            LoadMode::Default => self.render(glyph, false).map(|g| LoadedGlyph {
                metrics: g.metrics,
                bitmap: None,
            }),
            LoadMode::Render { monochrome } => self.render(glyph, monochrome),
        }
    }
}
