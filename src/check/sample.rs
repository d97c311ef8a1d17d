//! Generated test image for the smoke test

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Text drawn on the sample image
pub const SAMPLE_TEXT: &str = "HELLO OCR TEST";

const WIDTH: u32 = 200;
const HEIGHT: u32 = 50;
const SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// 5x7 bitmaps, one byte per row, bit 4 is the leftmost column
fn glyph(c: char) -> [u8; 7] {
    match c {
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        _ => [0; 7],
    }
}

/// Render [`SAMPLE_TEXT`] in black on a 200x50 white canvas
pub fn sample_image() -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([255, 255, 255]));
    let advance = (GLYPH_WIDTH + 1) * SCALE;
    let top = (HEIGHT - GLYPH_HEIGHT * SCALE) / 2;
    let mut left = 10;

    for c in SAMPLE_TEXT.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let x = left + col * SCALE + dx;
                        let y = top + row as u32 * SCALE + dy;
                        if x < WIDTH && y < HEIGHT {
                            img.put_pixel(x, y, Rgb([0, 0, 0]));
                        }
                    }
                }
            }
        }
        left += advance;
    }

    img
}

/// PNG-encoded [`sample_image`]
pub fn sample_png() -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(sample_image()).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
