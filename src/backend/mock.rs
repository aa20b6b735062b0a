//! Deterministic rasterizer for tests.
//!
//! Printable ASCII maps to glyphs `cp - 0x1F` (space is glyph 1). Glyph
//! boxes vary with the index so packing sees a spread of sizes; space has no
//! ink and a 6px advance.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use truetype_atlas_core::code_point::CodePoint;
use truetype_atlas_core::{GlyphIndex, Os2Metrics, RawGlyphMetrics, SizeMetrics};

use super::{GlyphBitmap, LoadMode, LoadedGlyph, RasterBackend, RasterFace};
use crate::error::FontError;

pub(crate) const GLYPH_COUNT: u32 = 100;
pub(crate) const SPACE_ADVANCE: f32 = 6.0;
pub(crate) const ASCENT: i32 = 10;
pub(crate) const DESCENT: i32 = 3;

/// Coverage byte of every rendered pixel.
pub(crate) const INK: u8 = 0xC0;

#[derive(Debug, Clone)]
pub(crate) struct MockConfig {
    pub scalable: bool,
    /// Glyphs whose rendered metrics are one pixel larger than their
    /// layout metrics.
    pub drift: Vec<GlyphIndex>,
    /// Glyphs that load for layout but fail to render.
    pub fail_render: Vec<GlyphIndex>,
    /// Glyphs that fail to load at all.
    pub fail_load: Vec<GlyphIndex>,
    /// Extra code point mappings.
    pub aliases: Vec<(CodePoint, GlyphIndex)>,
    pub os2: Option<Os2Metrics>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            scalable: true,
            drift: Vec::new(),
            fail_render: Vec::new(),
            fail_load: Vec::new(),
            aliases: Vec::new(),
            os2: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockBackend {
    config: MockConfig,
    loads: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            loads: Arc::default(),
        }
    }

    /// Faces created so far, across clones.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl RasterBackend for MockBackend {
    fn load_face(&self, data: Arc<[u8]>) -> Result<Box<dyn RasterFace>, FontError> {
        if data.is_empty() {
            return Err(FontError::BackendInit("empty font data".into()));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockFace {
            config: self.config.clone(),
            sized: false,
        }))
    }
}

struct MockFace {
    config: MockConfig,
    sized: bool,
}

/// Layout metrics of a glyph, in 26.6.
pub(crate) fn layout_metrics(glyph: GlyphIndex) -> RawGlyphMetrics {
    match glyph {
        0 => RawGlyphMetrics {
            width: 5 * 64,
            height: 8 * 64,
            hori_bearing_x: 64,
            hori_bearing_y: 8 * 64,
            advance_x: 7 * 64,
        },
        1 => RawGlyphMetrics {
            advance_x: (SPACE_ADVANCE * 64.0) as i64,
            ..RawGlyphMetrics::default()
        },
        g => {
            let w = i64::from(g % 7 + 3);
            let h = i64::from(g % 5 + 6);
            RawGlyphMetrics {
                width: w * 64,
                height: h * 64,
                hori_bearing_x: 64,
                hori_bearing_y: 8 * 64,
                advance_x: (w + 2) * 64,
            }
        }
    }
}

impl RasterFace for MockFace {
    fn is_scalable(&self) -> bool {
        self.config.scalable
    }

    fn glyph_count(&self) -> u32 {
        GLYPH_COUNT
    }

    fn glyph_index(&self, code_point: CodePoint) -> GlyphIndex {
        if let Some(&(_, g)) = self.config.aliases.iter().find(|(cp, _)| *cp == code_point) {
            return g;
        }
        match code_point {
            0x20..=0x7E => code_point - 0x1F,
            _ => 0,
        }
    }

    fn set_char_size(&mut self, size: i64, resolution: u32) -> Result<(), FontError> {
        if !self.config.scalable || size <= 0 || resolution == 0 {
            return Err(FontError::BackendInit("cannot set character size".into()));
        }
        self.sized = true;
        Ok(())
    }

    fn select_bitmap_strike(&mut self, strike: usize) -> Result<(), FontError> {
        if self.config.scalable || strike != 0 {
            return Err(FontError::BackendInit("no such strike".into()));
        }
        self.sized = true;
        Ok(())
    }

    fn size_metrics(&self) -> SizeMetrics {
        SizeMetrics {
            ascender: i64::from(ASCENT) * 64,
            descender: -i64::from(DESCENT) * 64,
            y_ppem: 13,
        }
    }

    fn os2_metrics(&self) -> Option<Os2Metrics> {
        self.config.os2
    }

    fn load_glyph(&mut self, glyph: GlyphIndex, mode: LoadMode) -> Option<LoadedGlyph> {
        if !self.sized || glyph >= GLYPH_COUNT || self.config.fail_load.contains(&glyph) {
            return None;
        }

        let mut metrics = layout_metrics(glyph);
        let LoadMode::Render { monochrome } = mode else {
            return Some(LoadedGlyph {
                metrics,
                bitmap: None,
            });
        };

        if self.config.fail_render.contains(&glyph) {
            return None;
        }
        if self.config.drift.contains(&glyph) {
            metrics.width += 64;
            metrics.height += 64;
            metrics.hori_bearing_y += 64;
        }

        let (w, h) = ((metrics.width / 64) as u32, (metrics.height / 64) as u32);
        let bitmap = (w > 0 && h > 0).then(|| {
            if monochrome {
                let pitch = (w as usize).div_ceil(8);
                GlyphBitmap::Mono {
                    width: w,
                    height: h,
                    pitch,
                    data: vec![0xFF; pitch * h as usize],
                }
            } else {
                GlyphBitmap::Gray {
                    width: w,
                    height: h,
                    data: vec![INK; w as usize * h as usize],
                }
            }
        });

        Some(LoadedGlyph { metrics, bitmap })
    }
}
