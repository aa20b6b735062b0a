//! Font resource: a rasterized glyph atlas plus the per-glyph layout table.
//!
//! A [`FontResource`] owns its configuration and declared code points.
//! [`FontResource::initialise`] loads the face through the shared
//! [`FaceCache`], measures every requested glyph, sizes and creates the atlas
//! texture, and draws all glyphs into it. Afterwards glyphs can be added one
//! at a time inside a [`lock`](FontResource::lock) /
//! [`unlock`](FontResource::unlock) window.

mod atlas;
mod build;

use std::collections::BTreeMap;

use log::{debug, error, info, warn};

use truetype_atlas_core::char_map::UNRESOLVED;
use truetype_atlas_core::code_point::{self, CodePoint};
use truetype_atlas_core::metrics::to_f26dot6;
use truetype_atlas_core::{CodePointSet, FontExtents, GlyphIndex, GlyphInfo};

use crate::backend::{LoadMode, RasterBackend, RasterFace};
use crate::cache::{FaceCache, FaceHandle};
use crate::config::FontConfig;
use crate::data::DataSource;
use crate::error::{ConfigError, FontError};
use crate::texture::{Texture, TextureProvider, TextureUsage};

use self::atlas::{Atlas, Raster};

/// Lifecycle of a [`FontResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Configured but never built.
    Unconfigured,
    /// A build is in progress.
    Initializing,
    /// Atlas and glyph table are usable.
    Ready,
    /// The last build failed. Lookups find nothing.
    Failed,
}

/// Result of a glyph lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphLookup<'a> {
    /// The code point is resolved.
    Found(&'a GlyphInfo),
    /// The code point is not resolved; this is the substitute glyph.
    Substitute(&'a GlyphInfo),
    /// Nothing to show: the resource is not built.
    Missing,
}

impl<'a> GlyphLookup<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The glyph to draw, resolved or substitute.
    pub fn info(self) -> Option<&'a GlyphInfo> {
        match self {
            Self::Found(info) | Self::Substitute(info) => Some(info),
            Self::Missing => None,
        }
    }
}

/// A TrueType font rasterized into a texture atlas.
pub struct FontResource {
    config: FontConfig,
    cache: FaceCache,
    state: ResourceState,
    /// Declared code points before a build, resolved ones after.
    char_map: CodePointSet,
    glyphs: BTreeMap<GlyphIndex, GlyphInfo>,
    /// Effective substitute. Falls back to [`code_point::NOT_DEFINED`].
    substitute_code: CodePoint,
    tab_width: f32,
    extents: FontExtents,
    face: Option<FaceHandle>,
    atlas: Option<Atlas>,
    locked: bool,
}

impl FontResource {
    /// Create an unbuilt resource. Fails if a code range in `config` is
    /// malformed.
    pub fn new(config: FontConfig, cache: FaceCache) -> Result<Self, ConfigError> {
        let char_map = config.code_points()?;
        Ok(Self {
            substitute_code: config.substitute_code,
            tab_width: config.tab_width,
            config,
            cache,
            state: ResourceState::Unconfigured,
            char_map,
            glyphs: BTreeMap::new(),
            extents: FontExtents::default(),
            face: None,
            atlas: None,
            locked: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn add_code_point(&mut self, cp: CodePoint) {
        self.char_map.add(cp);
    }

    pub fn remove_code_point(&mut self, cp: CodePoint) {
        self.char_map.remove(cp);
    }

    pub fn add_code_point_range(&mut self, first: CodePoint, last: CodePoint) {
        self.char_map.add_range(first, last);
    }

    pub fn remove_code_point_range(&mut self, first: CodePoint, last: CodePoint) {
        self.char_map.remove_range(first, last);
    }

    pub fn clear_code_points(&mut self) {
        self.char_map.clear();
    }

    /// Contiguous code point ranges, ascending. After a build these cover
    /// exactly the resolved code points. Pseudo code points are left out.
    pub fn code_point_ranges(&self) -> Vec<(CodePoint, CodePoint)> {
        self.char_map
            .ranges()
            .into_iter()
            .filter(|&(first, _)| !code_point::is_pseudo(first))
            .map(|(first, last)| (first, last.min(code_point::UNICODE_LAST)))
            .collect()
    }

    /// Load the face and build the atlas.
    ///
    /// Building again releases the previous face and texture first. On
    /// error the resource is left in [`ResourceState::Failed`] with no
    /// texture and an empty glyph table.
    pub fn initialise(
        &mut self,
        data: &dyn DataSource,
        backend: &dyn RasterBackend,
        textures: &dyn TextureProvider,
    ) -> Result<(), FontError> {
        // Acquire before releasing the previous face so a rebuild does not
        // evict and decode it again.
        let loaded = self.cache.load_or_acquire(&self.config.source, data, backend);
        self.teardown();
        self.state = ResourceState::Initializing;

        let face = match loaded {
            Ok(face) => face,
            Err(e) => {
                error!("font '{}': could not load '{}': {e}", self.config.name, self.config.source);
                self.state = ResourceState::Failed;
                return Err(e);
            }
        };

        let built = {
            let mut guard = face.lock();
            self.build(&mut **guard, textures)
        };

        match built {
            Ok(atlas) => {
                info!(
                    "font '{}': using texture size {} x {}",
                    self.config.name,
                    atlas.width(),
                    atlas.height()
                );
                info!(
                    "font '{}': using real height {} pixels",
                    self.config.name,
                    self.default_height()
                );
                self.atlas = Some(atlas);
                self.face = Some(face);
                self.state = ResourceState::Ready;
                Ok(())
            }
            Err(e) => {
                error!("font '{}': build failed: {e}", self.config.name);
                self.cache.release(&face);
                self.glyphs.clear();
                self.state = ResourceState::Failed;
                Err(e)
            }
        }
    }

    /// Glyph for `cp`, or the substitute glyph if `cp` is not resolved.
    pub fn glyph_info(&self, cp: CodePoint) -> GlyphLookup<'_> {
        if let Some(info) = self.resolved(cp).and_then(|g| self.glyphs.get(&g)) {
            return GlyphLookup::Found(info);
        }
        match self.resolved(self.substitute_code).and_then(|g| self.glyphs.get(&g)) {
            Some(info) => GlyphLookup::Substitute(info),
            None => GlyphLookup::Missing,
        }
    }

    pub fn texture(&self) -> Option<&dyn Texture> {
        self.atlas.as_ref().map(|a| a.texture())
    }

    /// Line height in pixels: ascent plus descent.
    pub fn default_height(&self) -> i32 {
        self.extents.height()
    }

    pub fn ascent(&self) -> i32 {
        self.extents.ascent
    }

    pub fn descent(&self) -> i32 {
        self.extents.descent
    }

    /// Code point whose glyph stands in for unresolved ones.
    pub fn substitute_code(&self) -> CodePoint {
        self.substitute_code
    }

    /// Glyphs in the table, synthetic ones included.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Open a glyph append window.
    ///
    /// Maps the texture for writing and sets the shared face to this
    /// resource's size. Returns `Ok(false)` if already locked or not built.
    pub fn lock(&mut self) -> Result<bool, FontError> {
        if self.locked {
            return Ok(false);
        }
        let (Some(face), Some(atlas)) = (self.face.as_ref(), self.atlas.as_mut()) else {
            return Ok(false);
        };

        apply_size(&mut **face.lock(), &self.config)?;
        atlas.texture_mut().lock(TextureUsage::WRITE)?;
        self.locked = true;
        Ok(true)
    }

    /// Rasterize one more glyph into the atlas.
    ///
    /// A code point that is already resolved is returned as is. Code points
    /// the face lacks, or whose glyph fails to load, yield the substitute.
    /// A full atlas is reported as [`FontError::PackingCapacity`] and leaves
    /// the atlas untouched.
    pub fn append_char(&mut self, cp: CodePoint) -> Result<GlyphLookup<'_>, FontError> {
        if !self.locked {
            return Err(FontError::NotLocked);
        }
        if self.resolved(cp).is_some() {
            return Ok(self.glyph_info(cp));
        }

        let face = self.face.clone().ok_or(FontError::NotReady)?;
        let mut guard = face.lock();
        let face: &mut dyn RasterFace = &mut **guard;
        // The face is shared and another resource may have resized it.
        apply_size(face, &self.config)?;

        let glyph = face.glyph_index(cp);
        if glyph == UNRESOLVED {
            return Ok(self.glyph_info(cp));
        }
        if !self.glyphs.contains_key(&glyph) && !self.append_glyph(face, glyph, cp)? {
            return Ok(self.glyph_info(cp));
        }

        self.char_map.set(cp, glyph);
        Ok(self.glyph_info(cp))
    }

    /// Close the append window and flush the texture.
    pub fn unlock(&mut self) {
        if !self.locked {
            return;
        }
        if let Some(atlas) = self.atlas.as_mut() {
            atlas.texture_mut().unlock();
        }
        self.locked = false;
    }

    /// Measure, place and draw a glyph the atlas does not have yet.
    fn append_glyph(
        &mut self,
        face: &mut dyn RasterFace,
        glyph: GlyphIndex,
        cp: CodePoint,
    ) -> Result<bool, FontError> {
        let Some(reference) = face.load_glyph(glyph, LoadMode::Default) else {
            warn!("font '{}': cannot load glyph {glyph} for character {cp:#x}", self.config.name);
            return Ok(false);
        };
        let mut info = reference.metrics.to_glyph_info(cp, self.extents.ascent, self.config.offset_height);
        let Some(raster) = self.rasterize(face, glyph, &info) else {
            warn!("font '{}': cannot render glyph {glyph} for character {cp:#x}", self.config.name);
            return Ok(false);
        };

        let atlas = self.atlas.as_mut().ok_or(FontError::NotReady)?;
        let (x, y) = atlas.allocate(info.pixel_width(), info.pixel_height())?;
        if let Raster::Ink(coverage) = raster {
            atlas.draw_coverage(x, y, &info, &coverage)?;
        }
        info.place(x, y, atlas.width(), atlas.height());
        debug!("font '{}': appended glyph {glyph} for {cp:#x} at ({x}, {y})", self.config.name);
        self.glyphs.insert(glyph, info);
        Ok(true)
    }

    /// Glyph index for a resolved code point.
    fn resolved(&self, cp: CodePoint) -> Option<GlyphIndex> {
        self.char_map
            .get(cp)
            .filter(|&g| g != UNRESOLVED || cp == code_point::NOT_DEFINED)
            .filter(|g| self.glyphs.contains_key(g))
    }

    /// Release the face and texture and forget every glyph.
    fn teardown(&mut self) {
        self.unlock();
        if let Some(mut atlas) = self.atlas.take() {
            atlas.texture_mut().destroy();
        }
        if let Some(face) = self.face.take() {
            self.cache.release(&face);
        }
        self.glyphs.clear();
        self.extents = FontExtents::default();
        self.substitute_code = self.config.substitute_code;
        self.tab_width = self.config.tab_width;
        self.state = ResourceState::Unconfigured;
    }
}

impl Drop for FontResource {
    fn drop(&mut self) {
        if self.locked {
            warn!("font '{}': dropped while locked", self.config.name);
        }
        self.teardown();
    }
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("glyphs", &self.glyphs.len())
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

/// Make the face's active size match `config`: the configured point size
/// for outline fonts, the first strike for bitmap fonts.
fn apply_size(face: &mut dyn RasterFace, config: &FontConfig) -> Result<(), FontError> {
    if face.is_scalable() {
        face.set_char_size(to_f26dot6(config.size), config.resolution)
    } else {
        face.select_bitmap_strike(0)
    }
}
