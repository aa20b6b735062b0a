//! Error types for font resources and their configuration.

use std::io;

use truetype_atlas_core::code_point::CodePoint;
use truetype_atlas_core::{BlitError, GlyphIndex, PackError};

/// Failure while building or extending a font resource.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("cannot load font source '{source_id}': {io}")]
    ResourceLoad {
        source_id: String,
        #[source]
        io: io::Error,
    },
    /// The rasterizer rejected the face or its size.
    #[error("rasterizer error: {0}")]
    BackendInit(String),
    /// A single glyph failed to load or render.
    #[error("cannot load glyph {glyph} for code point {code_point:#x}")]
    GlyphLoad { glyph: GlyphIndex, code_point: CodePoint },
    /// The fixed-size atlas has no room for another glyph.
    #[error("atlas capacity exceeded: {0}")]
    PackingCapacity(#[from] PackError),
    #[error("texture error: {0}")]
    Texture(String),
    #[error("font resource is not locked")]
    NotLocked,
    #[error("font resource is not initialised")]
    NotReady,
    #[error(transparent)]
    Blit(#[from] BlitError),
}

/// Failure while reading or applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("invalid code point range '{0}'")]
    InvalidRange(String),
}
