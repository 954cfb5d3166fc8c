//! Glyph substitution decoding.
//!
//! Some sources render text through a private substitution cipher: the
//! page contains nonstandard code points that only map back to real
//! characters through a per-site lookup table. [`GlyphMap`] holds that
//! table and decodes raw text as a pure function before any content
//! length checks happen.
//!
//! Characters without a mapping pass through unchanged; decoding is
//! never an error.

use std::collections::HashMap;

/// An immutable glyph-code → real-character substitution table.
///
/// Constructed once per source and injected via
/// [`Source::glyph_map`](crate::source::Source::glyph_map).
///
/// # Examples
///
/// ```rust
/// use novelsync::glyph::GlyphMap;
///
/// let map = GlyphMap::new([('\u{e001}', '的'), ('\u{e002}', '一')]);
/// assert_eq!(map.decode("\u{e001}天\u{e002}地"), "的天一地");
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlyphMap {
    table: HashMap<char, char>,
}

impl GlyphMap {
    /// Builds a map from `(obfuscated, real)` character pairs.
    pub fn new(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        Self {
            table: pairs.into_iter().collect(),
        }
    }

    /// Returns the number of mapped glyphs.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Decodes obfuscated text.
    ///
    /// Mapped characters are substituted; everything else is passed
    /// through unchanged, so decoding a plain-text page is a no-op.
    pub fn decode(&self, text: &str) -> String {
        if self.table.is_empty() {
            return text.to_string();
        }
        text.chars()
            .map(|c| self.table.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_substitutes_mapped_glyphs() {
        let map = GlyphMap::new([('\u{e000}', '人'), ('\u{e001}', '山')]);
        assert_eq!(map.decode("\u{e000}在\u{e001}中"), "人在山中");
    }

    #[test]
    fn decode_passes_unmapped_through() {
        let map = GlyphMap::new([('\u{e000}', '人')]);
        assert_eq!(map.decode("plain text 纯文本"), "plain text 纯文本");
    }

    #[test]
    fn empty_map_is_identity() {
        let map = GlyphMap::default();
        assert!(map.is_empty());
        assert_eq!(map.decode("anything"), "anything");
    }
}
