//! Raster helpers: masked bitmap compositing and the fallback placeholder.

use super::surface::RasterImage;
use crate::common::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Composite a BMP with its mask BMP into a PNG.
///
/// The mask is stored inverted: black keeps the pixel, white removes it, so
/// alpha is `255 - luminance(mask)`. A mask of a different size is scaled to
/// the bitmap first.
pub fn composite_masked(bitmap: &[u8], mask: &[u8]) -> Result<RasterImage> {
    let mut color = image::load_from_memory_with_format(bitmap, ImageFormat::Bmp)?.to_rgba8();
    let mut luma = image::load_from_memory_with_format(mask, ImageFormat::Bmp)?.to_luma8();

    let (width, height) = color.dimensions();
    if luma.dimensions() != (width, height) {
        luma = image::imageops::resize(&luma, width, height, FilterType::Nearest);
    }

    for (x, y, pixel) in color.enumerate_pixels_mut() {
        pixel[3] = 255 - luma.get_pixel(x, y)[0];
    }

    encode_png(DynamicImage::ImageRgba8(color))
}

/// Grey-bordered, crossed-out box shown in place of an undecodable image.
pub fn placeholder(width: u32, height: u32) -> Result<RasterImage> {
    let width = width.max(1);
    let height = height.max(1);
    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    let border_color = Rgba([128, 128, 128, 255]);

    // Draw border
    for x in 0..width {
        img.put_pixel(x, 0, border_color);
        img.put_pixel(x, height - 1, border_color);
    }
    for y in 0..height {
        img.put_pixel(0, y, border_color);
        img.put_pixel(width - 1, y, border_color);
    }

    // Draw diagonals
    let min_dim = width.min(height);
    for i in 0..min_dim {
        img.put_pixel(i, i, border_color);
        img.put_pixel(i, height - 1 - i, border_color);
    }

    encode_png(DynamicImage::ImageRgba8(img))
}

fn encode_png(image: DynamicImage) -> Result<RasterImage> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(RasterImage::new("image/png", buffer.into_inner()))
}
