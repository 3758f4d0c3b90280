//! QR-to-UPI extraction pipeline.
//!
//! Takes the raw bytes of an uploaded image (typically a screenshot of a
//! GPay or other UPI payment QR code), locates and decodes the QR symbol,
//! validates the payload as a UPI payment URI, and returns the payee
//! address.
//!
//! ```no_run
//! let bytes = std::fs::read("payment-qr.png").unwrap();
//! let payee = qrupi::extract_upi_id(&bytes).unwrap();
//! println!("pay to {payee}");
//! ```

pub mod decoder;
pub mod detector;
pub mod error;
mod image_decode;
pub mod models;
pub mod upi;

pub use error::ExtractError;
pub use image_decode::decode_image;
pub use models::{DecodedSymbol, ECLevel, MaskPattern, PixelGrid, Version};
pub use upi::validate_upi_payload;

use detector::{adaptive_binarize, otsu_binarize, FinderDetector};

/// Tuning knobs for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Use windowed adaptive thresholding for binarization. Turning this
    /// off selects a global Otsu threshold instead.
    pub adaptive_threshold: bool,
    /// Number of binarization passes to try. The first pass uses the
    /// configured strategy; a second pass retries with the other one.
    /// Values are clamped to 1..=2.
    pub max_symbol_search_attempts: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            adaptive_threshold: true,
            max_symbol_search_attempts: 1,
        }
    }
}

/// Extract the UPI payee address from an uploaded image, with default
/// configuration.
pub fn extract_upi_id(image_bytes: &[u8]) -> Result<String, ExtractError> {
    extract_upi_id_with_config(image_bytes, &ExtractorConfig::default())
}

/// Extract the UPI payee address from an uploaded image.
///
/// Runs the full pipeline: image decode, binarization, symbol location
/// and decode, UPI payload validation. Each stage failure maps to its own
/// [`ExtractError`] kind.
pub fn extract_upi_id_with_config(
    image_bytes: &[u8],
    config: &ExtractorConfig,
) -> Result<String, ExtractError> {
    let grid = decode_image(image_bytes)?;
    let symbol = locate_and_decode(&grid, config)?;
    validate_upi_payload(&symbol.text)
}

/// Locate a QR symbol in a luminance grid and decode it.
///
/// Returns [`ExtractError::SymbolNotFound`] when no plausible finder
/// triple exists and [`ExtractError::SymbolDecode`] when a located symbol
/// fails to decode; the latter carries the last stage failure.
pub fn locate_and_decode(
    grid: &PixelGrid,
    config: &ExtractorConfig,
) -> Result<DecodedSymbol, ExtractError> {
    let attempts = config.max_symbol_search_attempts.clamp(1, 2);
    let mut last_decode_failure: Option<String> = None;

    for attempt in 0..attempts {
        // second attempt swaps to the other binarization strategy
        let use_adaptive = if attempt == 0 {
            config.adaptive_threshold
        } else {
            !config.adaptive_threshold
        };
        let binary = if use_adaptive {
            adaptive_binarize(grid.luma(), grid.width(), grid.height())
        } else {
            otsu_binarize(grid.luma(), grid.width(), grid.height())
        };

        let patterns = FinderDetector::detect(&binary);
        let groups = detector::group_finder_patterns(&patterns);
        log::debug!(
            "attempt {}: {} finder patterns, {} candidate groups",
            attempt + 1,
            patterns.len(),
            groups.len()
        );

        for group in &groups {
            let corners = match detector::order_finder_patterns(
                &patterns[group[0]],
                &patterns[group[1]],
                &patterns[group[2]],
            ) {
                Some(corners) => corners,
                None => continue,
            };
            let transform = match decoder::build_transform(&corners) {
                Some(transform) => transform,
                None => continue,
            };

            let sampled = decoder::sample_modules(&binary, &transform, corners.dimension);
            match decoder::decode_symbol(&sampled) {
                Ok(symbol) => return Ok(symbol),
                Err(failure) => last_decode_failure = Some(failure),
            }
        }
    }

    match last_decode_failure {
        Some(detail) => Err(ExtractError::SymbolDecode(detail)),
        None => Err(ExtractError::SymbolNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ExtractorConfig::default();
        assert!(config.adaptive_threshold);
        assert_eq!(config.max_symbol_search_attempts, 1);
    }

    #[test]
    fn empty_grid_is_symbol_not_found() {
        let grid = PixelGrid::new(64, 64, vec![255u8; 64 * 64]).unwrap();
        let result = locate_and_decode(&grid, &ExtractorConfig::default());
        assert!(matches!(result, Err(ExtractError::SymbolNotFound)));
    }

    #[test]
    fn attempt_count_is_clamped() {
        // a huge attempt count must not loop; both strategies still find
        // nothing in a blank image
        let grid = PixelGrid::new(64, 64, vec![255u8; 64 * 64]).unwrap();
        let config = ExtractorConfig {
            adaptive_threshold: true,
            max_symbol_search_attempts: 100,
        };
        let result = locate_and_decode(&grid, &config);
        assert!(matches!(result, Err(ExtractError::SymbolNotFound)));
    }
}
