//! Standard 14 fonts used for exported text: metrics, WinAnsi encoding and line wrapping.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported standard font {0:?}")]
pub struct UnknownFont(pub String);

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em.
    pub fn glyph_width(self, code: u8) -> u16 {
        match self {
            Self::Courier => 600,
            Self::Helvetica => match code {
                0x20..=0x7e => HELVETICA_ASCII[(code - 0x20) as usize],
                _ => 556,
            },
        }
    }

    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 =
            text.chars().map(|ch| u32::from(self.glyph_width(win_ansi_code(ch).unwrap_or(b'?')))).sum();
        units as f32 * size / 1000.0
    }
}

impl FromStr for StandardFont {
    type Err = UnknownFont;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Helvetica" => Ok(Self::Helvetica),
            "Courier" => Ok(Self::Courier),
            other => Err(UnknownFont(other.to_owned())),
        }
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_font())
    }
}

// Helvetica AFM widths for 0x20 (space) through 0x7e (asciitilde).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// WinAnsiEncoding code for `ch`, if the encoding has one.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(code)
}

/// Encodes a single line for a simple font. Tabs become spaces; anything outside WinAnsi
/// becomes `?`. Returns the bytes and how many characters were replaced.
pub fn encode_win_ansi(line: &str) -> (Vec<u8>, usize) {
    let mut replaced = 0;
    let bytes = line
        .chars()
        .map(|ch| match ch {
            '\t' => b' ',
            _ => win_ansi_code(ch).unwrap_or_else(|| {
                replaced += 1;
                b'?'
            }),
        })
        .collect();
    (bytes, replaced)
}

/// Splits `text` into drawn lines: on explicit line breaks, then greedily on spaces so each
/// line fits `max_width`. A single word wider than the limit keeps a line of its own.
pub fn wrap_text(text: &str, font: StandardFont, size: f32, max_width: Option<f32>) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n').map(|line| line.trim_end_matches('\r')) {
        let Some(max_width) = max_width.filter(|width| *width > 0.0) else {
            lines.push(paragraph.to_owned());
            continue;
        };

        let mut current = String::new();
        for word in paragraph.split(' ') {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{current} {word}");
            if font.text_width(&candidate, size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}
