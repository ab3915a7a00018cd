// SPDX-License-Identifier: MIT
//
// Colors as the terminal sees them: 24-bit sRGB triples.
//
// The board only ever paints foreground text in truecolor, so there is no
// palette indexing, alpha, or color-space math here. A color is three bytes,
// written from a hex string and emitted as `ESC [ 38;2;R;G;B m`.

use std::fmt;

/// A 24-bit sRGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(0xFF, 0xFF, 0xFF);
    pub const BLACK: Self = Self(0, 0, 0);

    /// Parse a hex color string.
    ///
    /// Accepts `#RGB` and `#RRGGBB`, with or without the leading `#`.
    /// Returns `None` on anything else.
    ///
    /// ```
    /// use n_term::color::Rgb;
    ///
    /// assert_eq!(Rgb::hex("#f58231"), Some(Rgb(0xF5, 0x82, 0x31)));
    /// assert_eq!(Rgb::hex("fff"), Some(Rgb::WHITE));
    /// assert_eq!(Rgb::hex("#12345"), None);
    /// ```
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let bytes = s.as_bytes();

        match bytes.len() {
            // #RGB
            3 => {
                let r = parse_hex_digit(bytes[0])?;
                let g = parse_hex_digit(bytes[1])?;
                let b = parse_hex_digit(bytes[2])?;
                Some(Self(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            // #RRGGBB
            6 => {
                let r = parse_hex_byte(&bytes[0..2])?;
                let g = parse_hex_byte(&bytes[2..4])?;
                let b = parse_hex_byte(&bytes[4..6])?;
                Some(Self(r, g, b))
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({})", self.to_hex())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self(r, g, b)
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
