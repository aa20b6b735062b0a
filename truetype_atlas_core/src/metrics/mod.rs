//! Glyph and face metric conversion.
//!
//! Rasterizers report metrics in 26.6 fixed point (1/64 pixel). This module
//! turns those into [`GlyphInfo`] records and computes the font-wide
//! ascent/descent used for line layout.

use crate::code_point::CodePoint;
use crate::glyph::GlyphInfo;

/// Convert a 26.6 fixed-point value to pixels.
pub fn from_f26dot6(v: i64) -> f32 {
    v as f32 / 64.0
}

/// Convert pixels to 26.6 fixed point, rounding to the nearest 1/64.
pub fn to_f26dot6(v: f32) -> i64 {
    (v * 64.0).round() as i64
}

/// Glyph metrics as reported by the rasterizer, in 26.6 fixed point.
///
/// `hori_bearing_y` is measured upward from the baseline to the top of the
/// glyph's ink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawGlyphMetrics {
    pub width: i64,
    pub height: i64,
    pub hori_bearing_x: i64,
    pub hori_bearing_y: i64,
    pub advance_x: i64,
}

impl RawGlyphMetrics {
    /// Build a glyph record for `code_point`.
    ///
    /// `ascent` is the font ascent in whole pixels and `offset_height` the
    /// configured vertical shift.
    pub fn to_glyph_info(&self, code_point: CodePoint, ascent: i32, offset_height: i32) -> GlyphInfo {
        let bearing_x = from_f26dot6(self.hori_bearing_x);
        GlyphInfo::new(
            code_point,
            from_f26dot6(self.width),
            from_f26dot6(self.height),
            from_f26dot6(self.advance_x) - bearing_x,
            bearing_x,
            ascent as f32 - from_f26dot6(self.hori_bearing_y) - offset_height as f32,
        )
    }
}

/// Whether the layout fields of two glyphs disagree.
///
/// Some bytecode interpreters report different metrics when a glyph is
/// loaded for rendering than when it is loaded for layout. Code point and
/// atlas placement are not compared.
pub fn layout_differs(a: &GlyphInfo, b: &GlyphInfo) -> bool {
    a.width != b.width
        || a.height != b.height
        || a.advance != b.advance
        || a.bearing_x != b.bearing_x
        || a.bearing_y != b.bearing_y
}

/// Face metrics at the active character size, 26.6 fixed point.
///
/// `descender` follows the usual convention of being negative below the
/// baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeMetrics {
    pub ascender: i64,
    pub descender: i64,
    /// Vertical pixels per em at the active size.
    pub y_ppem: u32,
}

/// Raw vertical metrics from the OS/2 table, in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Os2Metrics {
    pub units_per_em: u16,
    pub win_ascent: u16,
    pub win_descent: u16,
    pub typo_ascender: i16,
    pub typo_descender: i16,
}

/// Font-wide line metrics in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontExtents {
    pub ascent: i32,
    pub descent: i32,
}

impl FontExtents {
    /// Largest ascent and descent across the size metrics and both OS/2
    /// metric sets. Fonts routinely under-report in one of them.
    pub fn compute(size: &SizeMetrics, os2: Option<&Os2Metrics>) -> Self {
        let mut ascent = (size.ascender >> 6) as i32;
        let mut descent = (-size.descender >> 6) as i32;

        if let Some(os2) = os2.filter(|t| t.units_per_em != 0) {
            let ppem = i64::from(size.y_ppem);
            let upem = i64::from(os2.units_per_em);
            let scale = |v: i64| (v * ppem / upem) as i32;

            ascent = ascent.max(scale(i64::from(os2.win_ascent)));
            descent = descent.max(scale(i64::from(os2.win_descent)));

            ascent = ascent.max(scale(i64::from(os2.typo_ascender)));
            descent = descent.max(scale(-i64::from(os2.typo_descender)));
        }

        Self { ascent, descent }
    }

    /// Line height: `ascent + descent`.
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }
}

#[cfg(test)]
mod tests;
