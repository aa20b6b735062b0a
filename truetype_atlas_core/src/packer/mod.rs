//! Atlas sizing and glyph placement.
//!
//! Glyphs are packed on shelves: left to right in rows, wrapping to a new row
//! when the current one is full. Sorting by height first (see
//! [`HeightBuckets`]) keeps each shelf close to uniform height, which wastes
//! little vertical space.
//!
//! The same [`ShelfPacker`] drives both the sizing pass (on an unbounded
//! canvas) and the real placement, so a planned atlas always holds every
//! glyph it was planned for.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::debug;

use crate::glyph::{GlyphIndex, GlyphInfo};

/// Gap in pixels between neighbouring glyphs and between shelves.
pub const GLYPH_SPACING: u32 = 1;

/// Upper bound on widening during planning.
const MAX_PLAN_WIDTH: u32 = 1 << 30;

/// Smallest power of two ≥ `v`. Zero maps to 1, and values above `2^31`
/// saturate to `2^31`.
pub fn first_pow2(v: u32) -> u32 {
    v.max(1).checked_next_power_of_two().unwrap_or(1 << 31)
}

/// Why a glyph could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    #[error("glyph {width}px wide cannot fit an atlas {canvas}px wide")]
    TooWide { width: u32, canvas: u32 },
    #[error("atlas is full: glyph needs rows up to {needed}px, atlas is {canvas}px tall")]
    Full { needed: u32, canvas: u32 },
}

/// Atlas dimensions in pixels. Both are powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSize {
    pub width: u32,
    pub height: u32,
}

impl AtlasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Grow each dimension to at least `min`'s.
    pub fn at_least(self, min: AtlasSize) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// Stateful shelf allocator over a fixed canvas.
///
/// Space on a shelf that has been left behind is never revisited. The
/// allocator keeps its cursor between calls, so after the initial build it
/// keeps serving glyphs appended on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    /// Tallest glyph on the current shelf.
    shelf_height: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            shelf_height: 0,
        }
    }

    /// A packer of fixed width with no height limit, for sizing passes.
    pub fn unbounded(width: u32) -> Self {
        Self::new(width, u32::MAX)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lowest row touched by any allocation so far.
    pub fn extent_height(&self) -> u32 {
        self.y.saturating_add(self.shelf_height)
    }

    /// Reserve a `width` × `height` rectangle and return its top-left corner.
    ///
    /// Zero-width requests take no space and are returned the current
    /// cursor. On error the packer is left unchanged.
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<(u32, u32), PackError> {
        if width == 0 {
            return Ok((self.x, self.y));
        }

        let needed = width.saturating_add(GLYPH_SPACING);
        if needed > self.width {
            return Err(PackError::TooWide {
                width,
                canvas: self.width,
            });
        }

        let (mut x, mut y, mut shelf) = (self.x, self.y, self.shelf_height);
        if x.saturating_add(needed) > self.width {
            x = 0;
            y = y.saturating_add(shelf).saturating_add(GLYPH_SPACING);
            shelf = 0;
        }

        let bottom = y.saturating_add(height);
        if bottom > self.height {
            return Err(PackError::Full {
                needed: bottom,
                canvas: self.height,
            });
        }

        self.x = x + needed;
        self.y = y;
        self.shelf_height = shelf.max(height);
        Ok((x, y))
    }
}

/// One glyph as seen by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackItem {
    pub glyph: GlyphIndex,
    pub width: u32,
    pub height: u32,
}

/// Glyphs grouped by pixel height, in packing order.
///
/// Iteration runs over heights ascending, then glyph indices ascending.
/// That order is what makes two builds of the same font produce identical
/// atlases.
#[derive(Debug, Clone, Default)]
pub struct HeightBuckets {
    buckets: BTreeMap<u32, BTreeMap<GlyphIndex, u32>>,
    len: usize,
}

impl HeightBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every glyph by its pixel height.
    pub fn from_glyphs<'a>(glyphs: impl IntoIterator<Item = (GlyphIndex, &'a GlyphInfo)>) -> Self {
        let mut buckets = Self::new();
        for (index, info) in glyphs {
            buckets.insert(index, info.pixel_width(), info.pixel_height());
        }
        buckets
    }

    /// Add a glyph. A glyph index already present keeps its first entry.
    pub fn insert(&mut self, glyph: GlyphIndex, width: u32, height: u32) {
        let bucket = self.buckets.entry(height).or_default();
        if let Entry::Vacant(slot) = bucket.entry(glyph) {
            slot.insert(width);
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Glyphs in packing order.
    pub fn items(&self) -> impl Iterator<Item = PackItem> + '_ {
        self.buckets.iter().flat_map(|(&height, bucket)| {
            bucket.iter().map(move |(&glyph, &width)| PackItem {
                glyph,
                width,
                height,
            })
        })
    }

    /// Choose the smallest reasonable power-of-two atlas for these glyphs.
    ///
    /// Starts from a square-ish estimate (total glyph width against mean
    /// glyph height) and then simulates the packing. While the result is more
    /// than twice as tall as wide, the width doubles and the simulation runs
    /// again.
    pub fn plan(&self) -> AtlasSize {
        let mut total_width: u64 = 0;
        let mut height_sum: u64 = 0;
        let mut widest = 0;
        for item in self.items() {
            if item.width > 0 {
                total_width += u64::from(item.width + GLYPH_SPACING);
            }
            height_sum += u64::from(item.height);
            widest = widest.max(item.width);
        }

        let mean_height = if self.len == 0 {
            0
        } else {
            height_sum.div_ceil(self.len as u64)
        };

        let mut width = first_pow2(clamp_u32(total_width));
        let mut height = first_pow2(clamp_u32(mean_height).saturating_add(GLYPH_SPACING));
        while width > height {
            width /= 2;
            height *= 2;
        }
        width = width.max(first_pow2(widest.saturating_add(GLYPH_SPACING)));

        loop {
            if height > width.saturating_mul(2) {
                width = width.saturating_mul(2);
            }
            height = first_pow2(self.simulate(width));
            if height <= width.saturating_mul(2) || width >= MAX_PLAN_WIDTH {
                break;
            }
            debug!("atlas {width}x{height} too tall, widening");
        }

        AtlasSize { width, height }
    }

    /// Packed height of every glyph on a canvas `width` pixels wide.
    fn simulate(&self, width: u32) -> u32 {
        let mut packer = ShelfPacker::unbounded(width);
        for item in self.items() {
            let placed = packer.allocate(item.width, item.height);
            debug_assert!(placed.is_ok(), "plan width {width} narrower than glyph {}", item.glyph);
        }
        packer.extent_height()
    }
}

fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
