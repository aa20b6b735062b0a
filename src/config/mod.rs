//! Font resource configuration and loading logic.
//!
//! A [`FontConfig`] is either read from TOML or filled key by key through
//! [`FontConfig::set_property`], which accepts the property names used by
//! resource definition files (`Source`, `Size`, `TextureSize`, ...).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use truetype_atlas_core::code_point::{self, CodePoint};
use truetype_atlas_core::packer::first_pow2;
use truetype_atlas_core::{AtlasSize, CodePointSet};

use crate::error::ConfigError;

/// Texture edge used when a fixed size leaves a dimension at 0.
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

/// Font resource configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Resource name. Also names the atlas texture.
    pub name: String,
    /// Font file path, resolved by the data source.
    pub source: String,
    /// Point size.
    pub size: f32,
    /// Dots per inch.
    pub resolution: u32,
    pub antialias: bool,
    /// Space glyph width and advance override in pixels. 0 keeps the font's.
    pub space_width: f32,
    /// Tab advance in pixels. 0 means eight spaces.
    pub tab_width: f32,
    /// Pixels to shift every glyph up.
    pub offset_height: i32,
    /// Code point drawn for characters the font lacks.
    pub substitute_code: CodePoint,
    pub texture_size: TextureSize,
    /// Code point inclusions and exclusions.
    pub codes: Vec<CodeRange>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "font".to_owned(),
            source: String::new(),
            size: 12.0,
            resolution: 96,
            antialias: false,
            space_width: 0.0,
            tab_width: 0.0,
            offset_height: 0,
            substitute_code: code_point::NOT_DEFINED,
            texture_size: TextureSize::default(),
            codes: Vec::new(),
        }
    }
}

/// Requested atlas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextureSize {
    /// Exactly as large as the glyphs need.
    Auto,
    /// A fixed canvas. Zero means [`DEFAULT_TEXTURE_SIZE`]. Grown if the
    /// glyphs do not fit.
    Fixed { width: u32, height: u32 },
}

impl Default for TextureSize {
    fn default() -> Self {
        Self::Fixed {
            width: 0,
            height: 0,
        }
    }
}

impl TextureSize {
    /// Final atlas size given the size the glyphs were planned into.
    pub fn resolve(self, planned: AtlasSize) -> AtlasSize {
        match self {
            Self::Auto => planned,
            Self::Fixed { width, height } => {
                let or_default = |v: u32| if v == 0 { DEFAULT_TEXTURE_SIZE } else { v };
                AtlasSize::new(or_default(width), or_default(height)).at_least(planned)
            }
        }
    }
}

impl FromStr for TextureSize {
    type Err = ConfigError;

    /// `"Auto"`, `"<width>"` or `"<width> <height>"`. Dimensions round up to
    /// a power of two.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }

        let invalid = || ConfigError::InvalidValue {
            key: "TextureSize".into(),
            value: s.to_owned(),
        };
        let mut parts = s.split_whitespace();
        let width: u32 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let height: u32 = match parts.next() {
            Some(h) => h.parse().map_err(|_| invalid())?,
            None => width,
        };
        let round = |v: u32| if v == 0 { 0 } else { first_pow2(v) };
        Ok(Self::Fixed {
            width: round(width),
            height: round(height),
        })
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed { width, height } => write!(f, "{width} {height}"),
        }
    }
}

impl TryFrom<String> for TextureSize {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TextureSize> for String {
    fn from(size: TextureSize) -> Self {
        size.to_string()
    }
}

/// One `Code` entry: an inclusion range, an exclusion range, or both.
///
/// Ranges are `"first"` or `"first last"`, decimal or `0x` hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeRange {
    pub range: Option<String>,
    pub hide: Option<String>,
}

/// Parse a `"first[ last]"` range. Empty input yields `None`.
///
/// Both ends must lie within `0..=0x10FFFF`.
pub fn parse_range(s: &str) -> Result<Option<(CodePoint, CodePoint)>, ConfigError> {
    let mut parts = s.split_whitespace();
    let Some(first) = parts.next() else {
        return Ok(None);
    };
    let first = parse_code_point(first).ok_or_else(|| ConfigError::InvalidRange(s.to_owned()))?;
    let last = match parts.next() {
        Some(l) => parse_code_point(l).ok_or_else(|| ConfigError::InvalidRange(s.to_owned()))?,
        None => first,
    };
    if parts.next().is_some() {
        return Err(ConfigError::InvalidRange(s.to_owned()));
    }
    Ok(Some((first, last)))
}

/// A single code point, rejecting values past the Unicode range.
fn parse_code_point(s: &str) -> Option<CodePoint> {
    let cp = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => s.parse().ok()?,
    };
    (cp <= code_point::UNICODE_LAST).then_some(cp)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

impl FontConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&data)?;
        debug!("config: loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply one resource-definition property.
    ///
    /// Deprecated keys are accepted with a warning. Unknown keys are
    /// ignored.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "Source" => self.source = value.to_owned(),
            "Size" => self.size = parse_num(key, value)?,
            "Resolution" => self.resolution = parse_num(key, value)?,
            "Antialias" => self.antialias = parse_bool(key, value)?,
            "SpaceWidth" => {
                self.space_width = parse_num(key, value)?;
                warn!(
                    "font '{}': property '{key}' is deprecated; remove it to use automatic calculation",
                    self.name
                );
            }
            "TabWidth" => self.tab_width = parse_num(key, value)?,
            "OffsetHeight" => self.offset_height = parse_num(key, value)?,
            "SubstituteCode" => {
                self.substitute_code =
                    parse_code_point(value.trim()).ok_or_else(|| invalid(key, value))?;
            }
            "TextureSize" => self.texture_size = value.parse()?,
            "CursorWidth" | "Distance" => {
                warn!("font '{}': property '{key}' is deprecated; value ignored", self.name);
            }
            _ => debug!("font '{}': ignoring unknown property '{key}'", self.name),
        }
        Ok(())
    }

    /// Append a `Code` entry.
    pub fn add_code(&mut self, range: Option<&str>, hide: Option<&str>) {
        self.codes.push(CodeRange {
            range: range.map(str::to_owned),
            hide: hide.map(str::to_owned),
        });
    }

    /// Code points requested by [`codes`](Self::codes).
    ///
    /// Inclusions apply first. Without any, the Basic Multilingual Plane is
    /// included. Exclusions apply last.
    pub fn code_points(&self) -> Result<CodePointSet, ConfigError> {
        let mut set = CodePointSet::new();
        for code in &self.codes {
            if let Some((first, last)) = code.range.as_deref().map(parse_range).transpose()?.flatten() {
                set.add_range(first, last);
            }
        }

        if set.is_empty() {
            set.add_range(0, code_point::BMP_LAST);
        }

        for code in &self.codes {
            if let Some((first, last)) = code.hide.as_deref().map(parse_range).transpose()?.flatten() {
                set.remove_range(first, last);
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests;
