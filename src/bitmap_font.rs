//! Fixed-size bitmap glyphs used where the outline label font has no glyph.
//!
//! Glyphs are stored in the GNU Unifont `.hex` format: one `CODEPOINT:BITS`
//! line per character, 16 rows of either 8 or 16 pixels, most significant bit
//! leftmost. The bundled table covers CJK punctuation, kana, the CJK Unified
//! Ideographs block, Hangul syllables and full-width forms.

use std::collections::HashMap;
use std::sync::OnceLock;

/// CJK subset of GNU Unifont. See `assets/fonts/Unifont-LICENSE.txt`.
pub const UNIFONT_CJK_HEX: &str = include_str!("../assets/fonts/unifont-cjk.hex");

/// Rows per glyph.
pub const GLYPH_ROWS: u32 = 16;

/// Rows above the baseline.
pub const ASCENT_ROWS: u32 = 14;

/// One glyph, `width` pixels wide (8 or 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapGlyph {
    width: u32,
    rows: [u16; GLYPH_ROWS as usize],
}

impl BitmapGlyph {
    fn parse(bits: &str) -> Option<Self> {
        let width = match bits.len() {
            32 => 8,
            64 => 16,
            _ => return None,
        };
        let digits = (width / 4) as usize;
        let mut rows = [0u16; GLYPH_ROWS as usize];
        for (i, row) in rows.iter_mut().enumerate() {
            let chunk = bits.get(i * digits..(i + 1) * digits)?;
            *row = u16::from_str_radix(chunk, 16).ok()?;
        }
        Some(Self { width, rows })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether the pixel at column `x`, row `y` is set.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= GLYPH_ROWS {
            return false;
        }
        (self.rows[y as usize] >> (self.width - 1 - x)) & 1 == 1
    }
}

#[derive(Debug, Default)]
pub struct BitmapFont {
    glyphs: HashMap<char, BitmapGlyph>,
}

impl BitmapFont {
    /// Parses a `.hex` glyph table. Lines that are not a valid scalar value
    /// followed by 32 or 64 hex digits are skipped.
    pub fn parse(hex: &str) -> Self {
        let glyphs = hex
            .lines()
            .filter_map(|line| {
                let (code, bits) = line.trim().split_once(':')?;
                let c = char::from_u32(u32::from_str_radix(code, 16).ok()?)?;
                Some((c, BitmapGlyph::parse(bits)?))
            })
            .collect();
        Self { glyphs }
    }

    /// The bundled CJK table, parsed on first use.
    pub fn unifont_cjk() -> &'static BitmapFont {
        static FONT: OnceLock<BitmapFont> = OnceLock::new();
        FONT.get_or_init(|| Self::parse(UNIFONT_CJK_HEX))
    }

    pub fn glyph(&self, c: char) -> Option<&BitmapGlyph> {
        self.glyphs.get(&c)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
