//! TrueType glyph atlases for UI text rendering.
//!
//! A [`FontResource`] rasterizes the configured code points of one font at
//! one size into a single texture and keeps the per-glyph layout table.
//! Faces are shared between resources through a [`FaceCache`].

pub mod backend;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod resource;
pub mod texture;

pub use truetype_atlas_core::{CodePointSet, GlyphIndex, GlyphInfo, PixelFormat, UvRect};
pub use truetype_atlas_core::code_point::{self, CodePoint};

pub use cache::FaceCache;
pub use config::{FontConfig, TextureSize};
pub use error::{ConfigError, FontError};
pub use resource::{FontResource, GlyphLookup, ResourceState};
