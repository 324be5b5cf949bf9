//! Line breaking algorithm

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Greedy line breaker over UAX #14 break opportunities
#[derive(Debug, Clone, Default)]
pub struct LineBreaker {
    metrics: FontMetrics,
}

impl LineBreaker {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    /// Split `text` into lines no wider than `max_width`, as byte ranges.
    ///
    /// Trailing whitespace hangs past the edge. A word wider than a whole line
    /// is broken between grapheme clusters. Empty text still yields one line.
    pub fn wrap(&self, text: &str, font_size: f32, max_width: f32) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        if text.is_empty() {
            lines.push(0..0);
            return lines;
        }

        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut segment_start = 0;

        for (offset, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..offset];
            let visible = self.metrics.text_width(segment.trim_end(), font_size);

            if line_width + visible > max_width && line_start < segment_start {
                lines.push(line_start..segment_start);
                line_start = segment_start;
                line_width = 0.0;
            }

            if line_width + visible > max_width {
                // Emergency break inside the segment
                for (idx, grapheme) in segment.grapheme_indices(true) {
                    let width = self.metrics.grapheme_width(grapheme, font_size);
                    let at = segment_start + idx;
                    if line_width + width > max_width && line_start < at {
                        lines.push(line_start..at);
                        line_start = at;
                        line_width = 0.0;
                    }
                    line_width += width;
                }
            } else {
                line_width += self.metrics.text_width(segment, font_size);
            }

            if matches!(opportunity, BreakOpportunity::Mandatory) {
                lines.push(line_start..offset);
                line_start = offset;
                line_width = 0.0;
            }
            segment_start = offset;
        }

        if line_start < text.len() {
            lines.push(line_start..text.len());
        }
        lines
    }

    /// Number of lines `text` wraps into
    pub fn count_lines(&self, text: &str, font_size: f32, max_width: f32) -> usize {
        self.wrap(text, font_size, max_width).len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8px per glyph at 16px
    fn breaker() -> LineBreaker {
        LineBreaker::new(FontMetrics::monospace(0.5))
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(breaker().wrap("", 16.0, 100.0), vec![0..0]);
        assert_eq!(breaker().count_lines("", 16.0, 100.0), 1);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(breaker().wrap("Hello", 16.0, 100.0), vec![0..5]);
    }

    #[test]
    fn test_line_wrap() {
        // 40px fits five glyphs
        let lines = breaker().wrap("Hello World", 16.0, 40.0);
        assert_eq!(lines, vec![0..6, 6..11]);
    }

    #[test]
    fn test_long_word_breaks_between_graphemes() {
        let lines = breaker().wrap("abcdefghij", 16.0, 40.0);
        assert_eq!(lines, vec![0..5, 5..10]);
    }

    #[test]
    fn test_explicit_newline() {
        let lines = breaker().wrap("Hello\nWorld", 16.0, 1000.0);
        assert_eq!(lines, vec![0..6, 6..11]);
    }

    #[test]
    fn test_more_text_never_fewer_lines() {
        let b = breaker();
        let short = b.count_lines("lorem ipsum dolor", 16.0, 80.0);
        let long = b.count_lines("lorem ipsum dolor sit amet consectetur", 16.0, 80.0);
        assert!(long >= short);
    }
}
