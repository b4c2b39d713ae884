//! Text measurement and encoding for the standard Helvetica fonts
//!
//! Generated pages use the base-14 Helvetica and Helvetica-Bold fonts with
//! WinAnsiEncoding, so nothing has to be embedded. Widths come from the Adobe
//! font metrics and are in 1/1000ths of the font size.

/// Standard font used on generated pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PostScript name written as the font's BaseFont
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in content streams
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

// Widths for character codes 32..=126
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Accented Latin letters are close to their base letters; this is the common lowercase width.
const FALLBACK_WIDTH: u16 = 556;

/// Map a character to its WinAnsiEncoding byte, or `?` when it has none
pub fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            // Tabs and other whitespace render as plain spaces
            c if c.is_whitespace() => b' ',
            _ => b'?',
        },
    }
}

/// Encode text as WinAnsi bytes
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// Width of a single encoded byte in 1/1000 em
fn byte_width(font: Font, byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => font.ascii_widths()[(byte - 0x20) as usize],
        0xA0 => font.ascii_widths()[0],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points
pub fn text_width(text: &str, font: Font, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| byte_width(font, win_ansi_byte(c)) as u32)
        .sum();
    units as f32 * font_size / 1000.0
}

/// Render text as a PDF literal string body, escaping delimiters
///
/// Bytes outside printable ASCII are written as octal escapes so content
/// streams stay plain ASCII.
pub fn pdf_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in encode_win_ansi(text) {
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out
}

/// Greedy word wrap to `max_width` points
///
/// Words wider than a whole line are broken between characters. Always returns
/// at least one line, which is empty only when `text` has no words.
pub fn wrap_text(text: &str, font: Font, font_size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", font, font_size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        for piece in split_long_word(word, font, font_size, max_width) {
            let width = text_width(&piece, font, font_size);
            if current.is_empty() {
                current = piece;
                current_width = width;
            } else if current_width + space + width <= max_width {
                current.push(' ');
                current.push_str(&piece);
                current_width += space + width;
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
                current_width = width;
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: &str, font: Font, font_size: f32, max_width: f32) -> Vec<String> {
    if text_width(word, font, font_size) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;
    for c in word.chars() {
        let w = byte_width(font, win_ansi_byte(c)) as f32 * font_size / 1000.0;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_uses_font_metrics() {
        // "Hi" = 722 + 222 units
        assert!((text_width("Hi", Font::Helvetica, 10.0) - 9.44).abs() < 0.001);
        assert!((text_width("Hi", Font::HelveticaBold, 10.0) - 10.0).abs() < 0.001);
        assert_eq!(text_width("", Font::Helvetica, 12.0), 0.0);
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(win_ansi_byte('A'), b'A');
        assert_eq!(win_ansi_byte('é'), 0xE9);
        assert_eq!(win_ansi_byte('€'), 0x80);
        assert_eq!(win_ansi_byte('—'), 0x97);
        assert_eq!(win_ansi_byte('漢'), b'?');
        assert_eq!(win_ansi_byte('\t'), b' ');
    }

    #[test]
    fn test_pdf_literal_escapes_special_characters() {
        assert_eq!(pdf_literal("a (b) c\\d"), "a \\(b\\) c\\\\d");
        assert_eq!(pdf_literal("café"), "caf\\351");
        assert_eq!(pdf_literal("日本"), "??");
    }

    #[test]
    fn test_wrap_text_short_line_unchanged() {
        let lines = wrap_text("Quarterly report", Font::Helvetica, 12.0, 378.0);
        assert_eq!(lines, vec!["Quarterly report".to_string()]);
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let text = "This is a very long filename that should definitely wrap onto a second line of the table";
        let lines = wrap_text(text, Font::Helvetica, 12.0, 378.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 12.0) <= 378.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_breaks_long_words() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, Font::Helvetica, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 12.0) <= 100.0);
        }
    }

    #[test]
    fn test_wrap_text_empty() {
        assert_eq!(wrap_text("   ", Font::Helvetica, 12.0, 100.0), vec![String::new()]);
    }
}
