//! Ordered code point → glyph index map.
//!
//! Before a build, entries map to glyph index 0 ("requested, not yet
//! resolved"). The build resolves each entry against the face and drops
//! code points the face cannot render, so afterwards every key names a glyph
//! that exists in the resource.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::code_point::CodePoint;
use crate::glyph::GlyphIndex;

/// Glyph index meaning "not resolved yet".
pub const UNRESOLVED: GlyphIndex = 0;

/// Ordered set of requested code points with their resolved glyph indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePointSet {
    map: BTreeMap<CodePoint, GlyphIndex>,
}

impl CodePointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a single code point. Keeps an existing resolution.
    pub fn add(&mut self, cp: CodePoint) {
        self.map.entry(cp).or_insert(UNRESOLVED);
    }

    pub fn remove(&mut self, cp: CodePoint) {
        self.map.remove(&cp);
    }

    /// Request every code point in `first..=last`. Empty when `first > last`.
    pub fn add_range(&mut self, first: CodePoint, last: CodePoint) {
        for cp in first..=last {
            self.map.entry(cp).or_insert(UNRESOLVED);
        }
    }

    /// Drop every code point in `first..=last`.
    pub fn remove_range(&mut self, first: CodePoint, last: CodePoint) {
        if first > last {
            return;
        }
        let doomed: Vec<CodePoint> = self
            .map
            .range(RangeInclusive::new(first, last))
            .map(|(&cp, _)| cp)
            .collect();
        for cp in doomed {
            self.map.remove(&cp);
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, cp: CodePoint) -> bool {
        self.map.contains_key(&cp)
    }

    /// Glyph index the code point resolves to, if requested.
    pub fn get(&self, cp: CodePoint) -> Option<GlyphIndex> {
        self.map.get(&cp).copied()
    }

    /// Map a code point to a glyph index, inserting it if needed.
    pub fn set(&mut self, cp: CodePoint, glyph: GlyphIndex) {
        self.map.insert(cp, glyph);
    }

    /// Requested code points in ascending order.
    pub fn code_points(&self) -> impl Iterator<Item = CodePoint> + '_ {
        self.map.keys().copied()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(CodePoint, GlyphIndex) -> bool) {
        self.map.retain(|&cp, &mut g| keep(cp, g));
    }

    /// Maximal contiguous runs of requested code points, ascending.
    ///
    /// Two keys belong to the same run when the second is exactly one
    /// greater than the first.
    pub fn ranges(&self) -> Vec<(CodePoint, CodePoint)> {
        let mut result = Vec::new();
        let mut keys = self.map.keys().copied();
        let Some(first) = keys.next() else {
            return result;
        };

        let (mut start, mut end) = (first, first);
        for cp in keys {
            if end.checked_add(1) == Some(cp) {
                end = cp;
            } else {
                result.push((start, end));
                start = cp;
                end = cp;
            }
        }
        result.push((start, end));
        result
    }
}
