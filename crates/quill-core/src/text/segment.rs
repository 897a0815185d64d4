use smallvec::SmallVec;

use crate::text::ShapedGlyph;

/// Splits `text` into words on runs of Unicode whitespace.
///
/// Leading and trailing whitespace is dropped and no empty segments are
/// produced, so an all-whitespace string yields nothing.
pub fn split_into_segments(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split_whitespace()
}

/// The shaped glyphs of a single word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub glyphs: SmallVec<[ShapedGlyph; 8]>,
    /// Sum of the glyphs' x advances.
    pub width: f32,
}

impl Segment {
    pub fn new(glyphs: impl IntoIterator<Item = ShapedGlyph>) -> Segment {
        let glyphs: SmallVec<[ShapedGlyph; 8]> = glyphs.into_iter().collect();
        let width = glyphs.iter().map(|g| g.x_advance).sum();
        Segment { glyphs, width }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::GlyphId;

    #[test]
    fn whitespace_only_yields_nothing() {
        for text in ["", "   ", "\t   ", "\n\t\r", "\r  \t", "\u{a0}\u{2003}"] {
            assert_eq!(split_into_segments(text).count(), 0, "{:?}", text);
        }
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        let segments: Vec<_> = split_into_segments("   This should be four").collect();
        assert_eq!(segments, ["This", "should", "be", "four"]);
    }

    #[test]
    fn runs_of_mixed_whitespace_are_one_separator() {
        let segments: Vec<_> = split_into_segments("a \t\r\n b\u{3000}c  ").collect();
        assert_eq!(segments, ["a", "b", "c"]);
        assert_eq!(segments.join(" "), "a b c");
    }

    #[test]
    fn segment_width_sums_advances() {
        let segment = Segment::new([
            ShapedGlyph::new(GlyphId(1), 10.0),
            ShapedGlyph::new(GlyphId(2), 12.5),
        ]);

        assert_eq!(segment.len(), 2);
        assert_eq!(segment.width, 22.5);
    }
}
