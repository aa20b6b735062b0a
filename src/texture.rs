//! Texture surfaces that receive the glyph atlas.
//!
//! The atlas is written through a lock/unlock window: the buffer is only
//! reachable between [`Texture::lock`] and [`Texture::unlock`].

use bitflags::bitflags;

use truetype_atlas_core::PixelFormat;

use crate::error::FontError;

bitflags! {
    /// How a texture will be used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const STATIC = 1 << 0;
        const WRITE = 1 << 1;
        const DYNAMIC = 1 << 2;
    }
}

/// A 2D surface that holds the glyph atlas.
pub trait Texture: Send {
    fn name(&self) -> &str;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> PixelFormat;

    /// Map the texture for access. Fails if already locked or destroyed.
    fn lock(&mut self, usage: TextureUsage) -> Result<(), FontError>;

    /// Writable pixel buffer, available only while locked.
    fn buffer_mut(&mut self) -> Option<&mut [u8]>;

    /// Current pixel contents, if the texture keeps a CPU copy.
    fn buffer(&self) -> Option<&[u8]>;

    fn is_locked(&self) -> bool;

    /// Flush writes and unmap. No-op when not locked.
    fn unlock(&mut self);

    /// Release the surface. Further locks fail.
    fn destroy(&mut self);
}

/// Creates texture surfaces.
pub trait TextureProvider {
    fn create(
        &self,
        name: &str,
        width: u32,
        height: u32,
        usage: TextureUsage,
        format: PixelFormat,
    ) -> Result<Box<dyn Texture>, FontError>;

    fn is_format_supported(&self, format: PixelFormat, usage: TextureUsage) -> bool;
}

/// CPU-side texture. Backs the command-line tool and tests.
#[derive(Debug)]
pub struct MemoryTexture {
    name: String,
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
    locked: bool,
    destroyed: bool,
}

impl MemoryTexture {
    pub fn new(name: &str, width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            name: name.to_owned(),
            width,
            height,
            format,
            pixels: vec![0; len],
            locked: false,
            destroyed: false,
        }
    }
}

impl Texture for MemoryTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn lock(&mut self, _usage: TextureUsage) -> Result<(), FontError> {
        if self.destroyed {
            return Err(FontError::Texture(format!("texture '{}' was destroyed", self.name)));
        }
        if self.locked {
            return Err(FontError::Texture(format!("texture '{}' is already locked", self.name)));
        }
        self.locked = true;
        Ok(())
    }

    fn buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.locked.then_some(self.pixels.as_mut_slice())
    }

    fn buffer(&self) -> Option<&[u8]> {
        (!self.destroyed).then_some(self.pixels.as_slice())
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn destroy(&mut self) {
        self.locked = false;
        self.destroyed = true;
        self.pixels = Vec::new();
    }
}

/// Hands out [`MemoryTexture`]s in a configurable set of formats.
#[derive(Debug, Clone)]
pub struct MemoryTextureProvider {
    formats: Vec<PixelFormat>,
}

impl Default for MemoryTextureProvider {
    fn default() -> Self {
        Self {
            formats: vec![PixelFormat::La8, PixelFormat::Rgba8],
        }
    }
}

impl MemoryTextureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that only accepts the given formats.
    pub fn with_formats(formats: &[PixelFormat]) -> Self {
        Self {
            formats: formats.to_vec(),
        }
    }
}

impl TextureProvider for MemoryTextureProvider {
    fn create(
        &self,
        name: &str,
        width: u32,
        height: u32,
        usage: TextureUsage,
        format: PixelFormat,
    ) -> Result<Box<dyn Texture>, FontError> {
        if !self.is_format_supported(format, usage) {
            return Err(FontError::Texture(format!("{format:?} is not supported")));
        }
        if width == 0 || height == 0 {
            return Err(FontError::Texture(format!("invalid size {width}x{height}")));
        }
        Ok(Box::new(MemoryTexture::new(name, width, height, format)))
    }

    fn is_format_supported(&self, format: PixelFormat, _usage: TextureUsage) -> bool {
        self.formats.contains(&format)
    }
}
