//! Full atlas build.
//!
//! The build runs in two phases. The first measures every glyph with
//! layout-mode metrics, which are final. The second buckets the glyphs by
//! height, sizes the texture from that, and renders each glyph into the slot
//! the shelf packer hands out in bucket order.

use log::{debug, warn};

use truetype_atlas_core::char_map::UNRESOLVED;
use truetype_atlas_core::code_point::{self, CodePoint};
use truetype_atlas_core::metrics::layout_differs;
use truetype_atlas_core::{
    CodePointSet, FontExtents, GlyphIndex, GlyphInfo, HeightBuckets, PixelFormat, blit,
};

use super::atlas::{Atlas, Raster};
use super::{FontResource, apply_size};
use crate::backend::{LoadMode, RasterFace};
use crate::error::FontError;
use crate::texture::{TextureProvider, TextureUsage};

/// Selection marker width in pixels.
const SELECTED_WIDTH: f32 = 1.0;

/// Cursor width in pixels.
const CURSOR_WIDTH: f32 = 2.0;

/// Alpha of a synthetic glyph's pixels. `None` for face glyphs.
fn marker_alpha(cp: CodePoint) -> Option<u8> {
    match cp {
        code_point::SELECTED => Some(0x88),
        code_point::SELECTED_BACK => Some(0x60),
        code_point::CURSOR => Some(0xFF),
        code_point::TAB => Some(0x00),
        _ => None,
    }
}

/// Name of the atlas texture for a resource.
pub(super) fn texture_name(resource: &str) -> String {
    format!("{resource}_TrueTypeFont")
}

impl FontResource {
    /// Measure, plan and draw every glyph. `face` must stay locked for the
    /// whole build.
    pub(super) fn build(
        &mut self,
        face: &mut dyn RasterFace,
        textures: &dyn TextureProvider,
    ) -> Result<Atlas, FontError> {
        apply_size(face, &self.config)?;
        self.extents = FontExtents::compute(&face.size_metrics(), face.os2_metrics().as_ref());

        // Markers and the missing glyph are recreated below.
        self.char_map.retain(|cp, _| !code_point::is_pseudo(cp));
        self.char_map.add(code_point::SPACE);

        self.collect_face_glyphs(face);
        self.adjust_space_and_tab();
        self.add_markers(face.glyph_count());
        self.resolve_substitute(face);

        let buckets = HeightBuckets::from_glyphs(self.glyphs.iter().map(|(&g, info)| (g, info)));
        let planned = buckets.plan();
        let size = self.config.texture_size.resolve(planned);
        debug!(
            "font '{}': {} glyphs planned into {}x{}, texture {}x{}",
            self.config.name,
            buckets.len(),
            planned.width,
            planned.height,
            size.width,
            size.height
        );

        let usage = TextureUsage::STATIC | TextureUsage::WRITE;
        let format = if textures.is_format_supported(PixelFormat::La8, usage) {
            PixelFormat::La8
        } else {
            PixelFormat::Rgba8
        };
        let texture = textures.create(
            &texture_name(&self.config.name),
            size.width,
            size.height,
            usage,
            format,
        )?;

        let mut atlas = Atlas::new(texture, self.config.antialias);
        if let Err(e) = atlas.texture_mut().lock(TextureUsage::WRITE) {
            atlas.texture_mut().destroy();
            return Err(e);
        }
        let drawn = atlas.clear().and_then(|()| self.draw_all(face, &buckets, &mut atlas));
        atlas.texture_mut().unlock();

        match drawn {
            Ok(()) => Ok(atlas),
            Err(e) => {
                atlas.texture_mut().destroy();
                Err(e)
            }
        }
    }

    /// Resolve every declared code point and record layout metrics for its
    /// glyph. Code points the face lacks or cannot load are dropped.
    fn collect_face_glyphs(&mut self, face: &mut dyn RasterFace) {
        let (ascent, offset) = (self.extents.ascent, self.config.offset_height);
        let mut resolved = CodePointSet::new();

        for cp in self.char_map.code_points() {
            let glyph = face.glyph_index(cp);
            if glyph == UNRESOLVED {
                continue;
            }
            if !self.glyphs.contains_key(&glyph) {
                let Some(loaded) = face.load_glyph(glyph, LoadMode::Default) else {
                    warn!(
                        "font '{}': cannot load glyph {glyph} for character {cp:#x}",
                        self.config.name
                    );
                    continue;
                };
                self.glyphs
                    .insert(glyph, loaded.metrics.to_glyph_info(cp, ascent, offset));
            }
            resolved.set(cp, glyph);
        }

        self.char_map = resolved;
    }

    /// Apply the space width override and derive the tab width.
    fn adjust_space_and_tab(&mut self) {
        let space = self
            .char_map
            .get(code_point::SPACE)
            .and_then(|g| self.glyphs.get_mut(&g))
            .filter(|info| info.code_point == code_point::SPACE);

        self.tab_width = self.config.tab_width;
        if let Some(space) = space {
            if self.config.space_width > 0.0 {
                space.width = self.config.space_width;
                space.advance = self.config.space_width;
            }
            if self.tab_width <= 0.0 {
                self.tab_width = 8.0 * space.advance;
            }
        }
    }

    /// Add the tab, selection and cursor glyphs at indices past the face's
    /// own. They replace any face glyph for the same code point.
    fn add_markers(&mut self, first: GlyphIndex) {
        let height = self.extents.height() as f32;
        let markers = [
            GlyphInfo::new(code_point::TAB, 0.0, 0.0, self.tab_width, 0.0, 0.0),
            GlyphInfo::new(code_point::SELECTED, SELECTED_WIDTH, height, 0.0, 0.0, 0.0),
            GlyphInfo::new(code_point::SELECTED_BACK, SELECTED_WIDTH, height, 0.0, 0.0, 0.0),
            GlyphInfo::new(code_point::CURSOR, CURSOR_WIDTH, height, 0.0, 0.0, 0.0),
        ];
        for (glyph, info) in (first..).zip(markers) {
            self.glyphs.insert(glyph, info);
            self.char_map.set(info.code_point, glyph);
        }
    }

    /// Fall back to the missing glyph when the configured substitute is not
    /// resolved, and create the missing glyph if it is in use.
    fn resolve_substitute(&mut self, face: &mut dyn RasterFace) {
        let wanted = self.config.substitute_code;
        self.substitute_code = if self.char_map.contains(wanted) {
            wanted
        } else {
            if wanted != code_point::NOT_DEFINED {
                debug!(
                    "font '{}': substitute {wanted:#x} not available, using the missing glyph",
                    self.config.name
                );
            }
            code_point::NOT_DEFINED
        };

        if self.substitute_code != code_point::NOT_DEFINED {
            return;
        }
        let info = match face.load_glyph(UNRESOLVED, LoadMode::Default) {
            Some(loaded) => loaded.metrics.to_glyph_info(
                code_point::NOT_DEFINED,
                self.extents.ascent,
                self.config.offset_height,
            ),
            None => {
                warn!("font '{}': cannot load the missing glyph", self.config.name);
                GlyphInfo::new(code_point::NOT_DEFINED, 0.0, 0.0, 0.0, 0.0, 0.0)
            }
        };
        self.glyphs.insert(UNRESOLVED, info);
        self.char_map.set(code_point::NOT_DEFINED, UNRESOLVED);
    }

    /// Allocate and draw every glyph in packing order.
    fn draw_all(
        &mut self,
        face: &mut dyn RasterFace,
        buckets: &HeightBuckets,
        atlas: &mut Atlas,
    ) -> Result<(), FontError> {
        let substitute = self.char_map.get(self.substitute_code);
        let mut failed = Vec::new();

        for item in buckets.items() {
            let Some(mut info) = self.glyphs.get(&item.glyph).copied() else {
                continue;
            };
            let (x, y) = atlas.allocate(item.width, item.height)?;

            if let Some(alpha) = marker_alpha(info.code_point) {
                atlas.draw_marker(x, y, &info, alpha)?;
            } else {
                match self.rasterize(face, item.glyph, &info) {
                    Some(Raster::Ink(coverage)) => atlas.draw_coverage(x, y, &info, &coverage)?,
                    Some(Raster::Blank) => {}
                    None => {
                        warn!(
                            "font '{}': cannot render glyph {} for character {:#x}",
                            self.config.name, item.glyph, info.code_point
                        );
                        // The substitute must always exist, even blank.
                        if substitute != Some(item.glyph) {
                            failed.push(item.glyph);
                            continue;
                        }
                    }
                }
            }

            info.place(x, y, atlas.width(), atlas.height());
            if matches!(info.code_point, code_point::SELECTED | code_point::SELECTED_BACK) {
                info.collapse_width();
            }
            self.glyphs.insert(item.glyph, info);
        }

        for glyph in failed {
            self.glyphs.remove(&glyph);
            self.char_map.retain(|_, g| g != glyph);
        }
        Ok(())
    }

    /// Render-mode load of `glyph`, fitted to the layout box in `info`.
    ///
    /// Layout metrics are authoritative; differences in the render-mode
    /// metrics are logged and otherwise ignored. `None` if the glyph cannot
    /// be rendered.
    pub(super) fn rasterize(
        &self,
        face: &mut dyn RasterFace,
        glyph: GlyphIndex,
        info: &GlyphInfo,
    ) -> Option<Raster> {
        let monochrome = !self.config.antialias;
        let loaded = face.load_glyph(glyph, LoadMode::Render { monochrome })?;

        let rendered =
            loaded
                .metrics
                .to_glyph_info(info.code_point, self.extents.ascent, self.config.offset_height);
        if layout_differs(&rendered, info) {
            debug!(
                "font '{}': glyph {glyph} renders at different metrics, keeping layout metrics",
                self.config.name
            );
        }

        let Some(bitmap) = loaded.bitmap else {
            return Some(Raster::Blank);
        };
        let (width, height) = (bitmap.width(), bitmap.height());
        let coverage = bitmap.into_gray();
        let fitted = blit::fit_bitmap(&coverage, width, height, info.pixel_width(), info.pixel_height());
        Some(Raster::Ink(fitted.into_owned()))
    }
}
