//! Font metrics for layout

use unicode_segmentation::UnicodeSegmentation;

/// Glyph advances in em units, scaled by the font size at measure time
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Advance of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Advance for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // Rough proportional sans-serif table
        let mut char_widths = vec![0.0; 128];
        for (c, width) in char_widths.iter_mut().enumerate() {
            *width = match c as u8 {
                b' ' => 0.28,
                b'i' | b'j' | b'l' | b'.' | b',' | b'\'' | b':' | b';' | b'!' | b'|' => 0.25,
                b'f' | b't' | b'r' | b'(' | b')' | b'-' => 0.35,
                b'm' | b'w' => 0.8,
                b'M' | b'W' => 0.9,
                b'A'..=b'Z' => 0.65,
                b'0'..=b'9' => 0.55,
                0..=31 | 127 => 0.0,
                _ => 0.5,
            };
        }

        Self {
            char_widths,
            default_width: 0.6,
        }
    }
}

impl FontMetrics {
    pub fn new(char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            char_widths,
            default_width,
        }
    }

    /// Every glyph advances by the same amount
    pub fn monospace(width_em: f32) -> Self {
        Self::new(vec![width_em; 128], width_em)
    }

    /// Get width of a character in em
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if c.is_control() {
            return 0.0;
        }
        self.default_width
    }

    /// Advance of one grapheme cluster in pixels. A cluster renders as one
    /// glyph, so combining marks add nothing.
    pub fn grapheme_width(&self, grapheme: &str, font_size: f32) -> f32 {
        match grapheme {
            "\t" => self.width(' ') * 4.0 * font_size,
            _ => grapheme
                .chars()
                .next()
                .map_or(0.0, |c| self.width(c) * font_size),
        }
    }

    /// Advance of a whole string in pixels
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.graphemes(true)
            .map(|g| self.grapheme_width(g, font_size))
            .sum()
    }
}
