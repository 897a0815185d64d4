use crate::text::{split_into_segments, Segment};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Lines are wrapped once they would get wider than this.
    pub max_width: f32,
    pub line_height: f32,
    /// Gap between two words on the same line.
    pub word_gap: f32,
}

/// A word together with the pen position at which its glyphs begin, relative
/// to the top-left corner of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSegment {
    pub segment: Segment,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// Result of laying out a piece of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    /// Width of the widest line. May exceed the allowed width when a single
    /// word doesn't fit on a line by itself.
    pub width: f32,
    pub height: f32,
    pub line_count: usize,
    pub glyph_count: usize,
    pub segments: Vec<PlacedSegment>,
}

impl TextLayout {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Splits `text` into words, shapes every word with `shape` and wraps them
/// into lines.
pub fn layout_text(
    text: &str,
    params: &LayoutParams,
    mut shape: impl FnMut(&str) -> Segment,
) -> TextLayout {
    let mut layouter = Layouter::new(*params);
    for word in split_into_segments(text) {
        layouter.push(shape(word));
    }
    layouter.finish()
}

/// Greedy line breaker. Words are placed left to right and a word that
/// doesn't fit on the current line starts a new one.
///
/// The first word of a line never breaks, so a word wider than `max_width`
/// overflows its line instead of leaving an empty line above it. Words are
/// never split. The line count starts at zero and the first word opens the
/// first line: text without words has no lines and a height of 0.
#[derive(Debug)]
pub struct Layouter {
    params: LayoutParams,
    line_width: f32,
    line_is_empty: bool,
    y_offset: f32,
    layout: TextLayout,
}

impl Layouter {
    pub fn new(params: LayoutParams) -> Layouter {
        Layouter {
            params,
            // the first word of a line gets no leading gap
            line_width: -params.word_gap,
            line_is_empty: true,
            y_offset: 0.0,
            layout: TextLayout::default(),
        }
    }

    pub fn push(&mut self, segment: Segment) {
        let LayoutParams {
            max_width,
            line_height,
            word_gap,
        } = self.params;

        if self.layout.line_count == 0 {
            self.layout.line_count = 1;
            self.layout.height = line_height;
        }

        let break_line =
            !self.line_is_empty && self.line_width + segment.width + word_gap > max_width;

        let x_offset = if break_line {
            self.line_width = segment.width;
            self.y_offset += line_height;
            self.layout.height += line_height;
            self.layout.line_count += 1;
            0.0
        } else {
            let x_offset = self.line_width + word_gap;
            self.line_width = x_offset + segment.width;
            x_offset
        };

        self.line_is_empty = false;
        self.layout.width = self.layout.width.max(self.line_width);
        self.layout.glyph_count += segment.len();
        self.layout.segments.push(PlacedSegment {
            segment,
            x_offset,
            y_offset: self.y_offset,
        });
    }

    pub fn finish(self) -> TextLayout {
        self.layout
    }
}
