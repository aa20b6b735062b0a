//! Unicode code points and the internal pseudo code points used for
//! synthetic glyphs.
//!
//! The pseudo code points live above the Unicode range (`0x10FFFF`) so they
//! can never collide with a character requested by the caller.

/// A Unicode scalar value, or one of the pseudo code points below.
pub type CodePoint = u32;

/// Horizontal tab. Always backed by a synthetic glyph.
pub const TAB: CodePoint = 0x0009;

/// Space. Force-included in every font build.
pub const SPACE: CodePoint = 0x0020;

/// Last code point of the Basic Multilingual Plane.
pub const BMP_LAST: CodePoint = 0xFFFF;

/// Highest valid Unicode scalar value.
pub const UNICODE_LAST: CodePoint = 0x10FFFF;

/// Foreground selection marker.
pub const SELECTED: CodePoint = 0x1F_FFFF;

/// Background selection marker.
pub const SELECTED_BACK: CodePoint = 0x1F_FFFE;

/// Text cursor.
pub const CURSOR: CodePoint = 0x1F_FFFD;

/// The rasterizer's "missing glyph" (glyph index 0).
pub const NOT_DEFINED: CodePoint = 0x1F_FFFC;

/// Whether the code point is one of the internal pseudo code points.
pub fn is_pseudo(cp: CodePoint) -> bool {
    cp > UNICODE_LAST
}
