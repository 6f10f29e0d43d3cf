//! Sprite artwork: decoding into a small RGBA grid

use image::{imageops::FilterType, GenericImageView, RgbaImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Longest side a decoded sprite is scaled down to
pub const SPRITE_MAX_PIXELS: u32 = 48;

/// Pixels below this alpha count as background
pub const ALPHA_THRESHOLD: u8 = 128;

/// Decoded artwork, row-major RGBA
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SpriteData {
    pub fn from_rgba(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        }
    }

    /// Opaque color at a pixel, `None` for background or out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        match self.pixels.get(offset..offset + 4)? {
            [r, g, b, a] if *a >= ALPHA_THRESHOLD => Some((*r, *g, *b)),
            _ => None,
        }
    }

    /// Cell footprint at the largest scale (never above 1:1) that fits
    /// `max_cols` x `max_rows`; one cell holds two stacked pixels
    pub fn fit(&self, max_cols: u16, max_rows: u16) -> (u16, u16) {
        if self.width == 0 || self.height == 0 || max_cols == 0 || max_rows == 0 {
            return (0, 0);
        }
        let scale = (max_cols as f32 / self.width as f32)
            .min(max_rows as f32 * 2.0 / self.height as f32)
            .min(1.0);
        let cols = (self.width as f32 * scale).round().max(1.0) as u16;
        let pixel_rows = (self.height as f32 * scale).round().max(1.0);
        let rows = (pixel_rows / 2.0).ceil() as u16;
        (cols.min(max_cols), rows.min(max_rows))
    }
}

/// Decodes PNG/GIF bytes, crops the transparent margin and scales down to
/// [`SPRITE_MAX_PIXELS`]
pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err("empty image".to_string());
    }
    let cropped = crop_to_content(&image.to_rgba8());

    let (width, height) = cropped.dimensions();
    let longest = width.max(height);
    if longest <= SPRITE_MAX_PIXELS {
        return Ok(SpriteData::from_rgba(&cropped));
    }
    let new_width = (width * SPRITE_MAX_PIXELS / longest).max(1);
    let new_height = (height * SPRITE_MAX_PIXELS / longest).max(1);
    let resized = image::imageops::resize(&cropped, new_width, new_height, FilterType::Nearest);
    Ok(SpriteData::from_rgba(&resized))
}

/// Bounding box of the opaque pixels; fully transparent images are kept whole
fn crop_to_content(image: &RgbaImage) -> RgbaImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] < ALPHA_THRESHOLD {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    match bounds {
        Some((x0, y0, x1, y1)) => {
            image::imageops::crop_imm(image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => image.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_crops_transparent_margin() {
        let mut image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        for y in 2..6 {
            for x in 3..5 {
                image.put_pixel(x, y, Rgba([200, 40, 40, 255]));
            }
        }
        let sprite = decode_sprite(&png(image)).unwrap();

        assert_eq!((sprite.width, sprite.height), (2, 4));
        assert_eq!(sprite.pixel(0, 0), Some((200, 40, 40)));
        assert_eq!(sprite.pixel(2, 0), None);
    }

    #[test]
    fn test_decode_scales_large_images() {
        let image = RgbaImage::from_pixel(96, 48, Rgba([10, 200, 90, 255]));
        let sprite = decode_sprite(&png(image)).unwrap();
        assert_eq!((sprite.width, sprite.height), (48, 24));
        assert_eq!(sprite.pixels.len(), 48 * 24 * 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_sprite(b"not an image").is_err());
    }

    #[test]
    fn test_fit_keeps_aspect_and_bounds() {
        let sprite = SpriteData {
            width: 40,
            height: 40,
            pixels: vec![255; 40 * 40 * 4],
        };
        // 40x40 px is 40 cols x 20 rows at 1:1
        assert_eq!(sprite.fit(48, 24), (40, 20));
        // Height-bound: 10 rows is 20 px, so half scale
        assert_eq!(sprite.fit(48, 10), (20, 10));
        assert_eq!(sprite.fit(0, 10), (0, 0));
    }
}
