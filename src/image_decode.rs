//! Image decoding: raw PNG/JPEG bytes to a luminance [`PixelGrid`].
//!
//! The format is sniffed from the byte content, never from a filename. The
//! decoder performs no filesystem or network access; callers hand it a fully
//! buffered upload.

use image::DynamicImage;
use rayon::prelude::*;

use crate::error::ExtractError;
use crate::models::PixelGrid;

/// Y = (76*R + 150*G + 29*B) >> 8, integer approximation of BT.601 luma.
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Images at or above this pixel count get row-parallel luma conversion.
const PARALLEL_PIXEL_THRESHOLD: usize = 1 << 20;

/// Decode an in-memory image file into a luminance grid.
pub fn decode_image(bytes: &[u8]) -> Result<PixelGrid, ExtractError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractError::ImageDecode(e.to_string()))?;

    let width = img.width() as usize;
    let height = img.height() as usize;
    log::debug!("decoded {}x{} image ({:?})", width, height, img.color());

    let luma = match img {
        DynamicImage::ImageLuma8(gray) => gray.into_raw(),
        img if img.color().has_alpha() => {
            rgba_to_luma(&img.to_rgba8().into_raw(), width, height)
        }
        img => rgb_to_luma(&img.to_rgb8().into_raw(), width, height),
    };

    PixelGrid::new(width, height, luma)
}

/// Convert packed RGB samples to luminance, row-parallel for large frames.
pub fn rgb_to_luma(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    luma_from_channels::<3>(rgb, width, height)
}

/// Convert packed RGBA samples to luminance; alpha is ignored.
pub fn rgba_to_luma(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    luma_from_channels::<4>(rgba, width, height)
}

fn luma_from_channels<const CH: usize>(samples: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(samples.len(), width * height * CH);
    let mut luma = vec![0u8; width * height];

    let convert_row = |y: usize, row: &mut [u8]| {
        let row_start = y * width * CH;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * CH;
            let r = samples[idx] as u32;
            let g = samples[idx + 1] as u32;
            let b = samples[idx + 2] as u32;
            *out = ((COEF_R * r + COEF_G * g + COEF_B * b) >> 8).min(255) as u8;
        }
    };

    if width * height >= PARALLEL_PIXEL_THRESHOLD {
        luma.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| convert_row(y, row));
    } else {
        for (y, row) in luma.chunks_mut(width).enumerate() {
            convert_row(y, row);
        }
    }

    luma
}
