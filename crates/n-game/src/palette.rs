//! Tile colours.
//!
//! Each tile value up to 1024 has its own foreground colour; everything
//! larger shares one. Empty cells paint white.

use n_term::color::Rgb;

pub const EMPTY: Rgb = Rgb(0xFF, 0xFF, 0xFF);
pub const TILE_2: Rgb = Rgb(0xFF, 0xFA, 0xC8);
pub const TILE_4: Rgb = Rgb(0xFA, 0xBE, 0xBE);
pub const TILE_8: Rgb = Rgb(0xE6, 0xBE, 0xFF);
pub const TILE_16: Rgb = Rgb(0xAA, 0xFF, 0xC3);
pub const TILE_32: Rgb = Rgb(0x46, 0x99, 0x90);
pub const TILE_64: Rgb = Rgb(0x43, 0x63, 0xD8);
pub const TILE_128: Rgb = Rgb(0xFF, 0xE1, 0x19);
pub const TILE_256: Rgb = Rgb(0x80, 0x00, 0x00);
pub const TILE_512: Rgb = Rgb(0xF5, 0x82, 0x31);
pub const TILE_1024: Rgb = Rgb(0xF0, 0x32, 0xE6);
/// 2048 and beyond.
pub const TILE_HIGH: Rgb = Rgb(0xE6, 0x19, 0x4B);

/// Foreground colour for a cell.
#[must_use]
pub const fn tile_color(tile: Option<u32>) -> Rgb {
    match tile {
        None => EMPTY,
        Some(2) => TILE_2,
        Some(4) => TILE_4,
        Some(8) => TILE_8,
        Some(16) => TILE_16,
        Some(32) => TILE_32,
        Some(64) => TILE_64,
        Some(128) => TILE_128,
        Some(256) => TILE_256,
        Some(512) => TILE_512,
        Some(1024) => TILE_1024,
        Some(_) => TILE_HIGH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_matches_hex_values() {
        let table = [
            (None, "#ffffff"),
            (Some(2), "#fffac8"),
            (Some(4), "#fabebe"),
            (Some(8), "#e6beff"),
            (Some(16), "#aaffc3"),
            (Some(32), "#469990"),
            (Some(64), "#4363d8"),
            (Some(128), "#ffe119"),
            (Some(256), "#800000"),
            (Some(512), "#f58231"),
            (Some(1024), "#f032e6"),
            (Some(2048), "#e6194b"),
        ];
        for (tile, hex) in table {
            assert_eq!(Some(tile_color(tile)), Rgb::hex(hex), "tile {tile:?}");
        }
    }

    #[test]
    fn large_tiles_share_one_colour() {
        assert_eq!(tile_color(Some(4096)), TILE_HIGH);
        assert_eq!(tile_color(Some(131_072)), TILE_HIGH);
    }

    #[test]
    fn distinct_colours_below_2048() {
        let mut seen: Vec<Rgb> = (1..=10).map(|e| tile_color(Some(1 << e))).collect();
        seen.push(EMPTY);
        seen.push(TILE_HIGH);
        let count = seen.len();
        seen.sort_by_key(|c| (c.0, c.1, c.2));
        seen.dedup();
        assert_eq!(seen.len(), count);
    }
}
