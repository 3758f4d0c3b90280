//! Luminance-to-binary conversion.
//!
//! Two strategies: a windowed adaptive threshold (default, tolerates uneven
//! lighting across a photographed screen) and Otsu's global threshold (the
//! simpler fallback; a single global cut is less robust on shaded images but
//! cheap and effective on clean screenshots).

use crate::models::BitMatrix;

/// Window side for the adaptive mean, in pixels. Must be odd.
pub const ADAPTIVE_WINDOW: usize = 31;

/// A pixel is black when it is at least this much darker than the local
/// window mean, expressed as a fraction of the mean (Bradley's method).
const ADAPTIVE_FRACTION_NUM: u64 = 85;
const ADAPTIVE_FRACTION_DEN: u64 = 100;

/// Adaptive binarization against the mean of a sliding window, computed via
/// an integral image so the whole pass is O(pixels).
pub fn adaptive_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);
    if width == 0 || height == 0 {
        return binary;
    }

    // Integral image with a zero row/column border.
    let iw = width + 1;
    let mut integral = vec![0u64; iw * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * iw + (x + 1)] = integral[y * iw + (x + 1)] + row_sum;
        }
    }

    let half = ADAPTIVE_WINDOW / 2;
    for y in 0..height {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half + 1).min(width);

            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let sum = integral[y1 * iw + x1] + integral[y0 * iw + x0]
                - integral[y0 * iw + x1]
                - integral[y1 * iw + x0];

            // pixel < mean * fraction, kept in integer arithmetic
            let is_black = (gray[y * width + x] as u64) * area * ADAPTIVE_FRACTION_DEN
                < sum * ADAPTIVE_FRACTION_NUM;
            binary.set(x, y, is_black);
        }
    }

    binary
}

/// Global binarization at Otsu's optimal threshold.
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    let threshold = otsu_threshold(gray);
    let mut binary = BitMatrix::new(width, height);

    for y in 0..height {
        for x in 0..width {
            binary.set(x, y, gray[y * width + x] < threshold);
        }
    }

    binary
}

/// Otsu's method: pick the threshold maximizing between-class variance.
fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let mut max_variance = 0.0;
    let mut optimal = 128u8;

    for threshold in 0..=255u8 {
        let mut dark_pixels = 0u64;
        let mut dark_sum = 0u64;
        let mut light_pixels = 0u64;
        let mut light_sum = 0u64;

        for intensity in 0..=255u32 {
            let count = histogram[intensity as usize] as u64;
            if intensity < threshold as u32 {
                dark_pixels += count;
                dark_sum += count * intensity as u64;
            } else {
                light_pixels += count;
                light_sum += count * intensity as u64;
            }
        }

        if dark_pixels == 0 || light_pixels == 0 {
            continue;
        }

        let dark_mean = dark_sum as f64 / dark_pixels as f64;
        let light_mean = light_sum as f64 / light_pixels as f64;
        let w_dark = dark_pixels as f64 / total;
        let w_light = light_pixels as f64 / total;
        let variance = w_dark * w_light * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal = threshold;
        }
    }

    optimal
}
