//! Core glyph atlas data structures and algorithms.
//!
//! This crate provides the backend-independent half of the font atlas
//! pipeline: code point bookkeeping, glyph metric conversion from 26.6
//! fixed point, height-bucketed shelf packing, and the pixel writers that
//! copy glyph coverage into a texture buffer. It contains no rasterizer,
//! texture, or file I/O code.

#![deny(unsafe_code)]

pub mod blit;
pub mod char_map;
pub mod code_point;
pub mod glyph;
pub mod metrics;
pub mod packer;

pub use blit::{BlitError, Blitter, Fill, PixelFormat, Rect, SourceMode};
pub use char_map::CodePointSet;
pub use glyph::{GlyphIndex, GlyphInfo, UvRect};
pub use metrics::{FontExtents, Os2Metrics, RawGlyphMetrics, SizeMetrics};
pub use packer::{AtlasSize, GLYPH_SPACING, HeightBuckets, PackError, ShelfPacker};
