//! Tiny 5x7 bitmap font for the raster backend.
//!
//! Covers what the viewer draws: order labels (digits) and the placeholder
//! messages. Characters outside the table are skipped but still advance.

use image::{Rgba, RgbaImage};

/// Glyph cell width before scaling.
pub const GLYPH_WIDTH: i32 = 5;
/// Glyph cell height before scaling.
pub const GLYPH_HEIGHT: i32 = 7;

#[rustfmt::skip]
const FONT_5X7: &[(char, [u8; 7])] = &[
    // Each row is 5 bits, bit 4 is the leftmost column.
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('D', [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
];

fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    let upper = ch.to_ascii_uppercase();
    FONT_5X7.iter().find(|(c, _)| *c == upper).map(|(_, rows)| *rows)
}

/// Horizontal advance per character, including one scaled column of spacing.
#[must_use]
pub fn advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

/// Rendered width of `text` in pixels.
#[must_use]
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    (n.saturating_mul(advance(scale)) - scale).max(0)
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels off the image are clipped.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: i32, y: i32, scale: i32, color: Rgba<u8>) {
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(img, &rows, pen_x, y, scale, color);
        }
        pen_x += advance(scale);
    }
}

fn draw_glyph(img: &mut RgbaImage, rows: &[u8; 7], x: i32, y: i32, scale: i32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for (row_idx, &bits) in (0_i32..).zip(rows.iter()) {
        for col in 0..GLYPH_WIDTH {
            if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let sx = x + col * scale + dx;
                    let sy = y + row_idx * scale + dy;
                    if let (Ok(px), Ok(py)) = (u32::try_from(sx), u32::try_from(sy)) {
                        if px < w && py < h {
                            img.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
    }
}
