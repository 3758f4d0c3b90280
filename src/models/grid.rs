use crate::error::ExtractError;

/// Immutable luminance raster produced by the image decoder.
///
/// One 8-bit luma sample per pixel, row-major. Owned by a single extraction
/// call; nothing in the pipeline mutates or shares it.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    luma: Vec<u8>,
}

impl PixelGrid {
    /// Build a grid, rejecting dimensions that do not match the sample count.
    pub fn new(width: usize, height: usize, luma: Vec<u8>) -> Result<Self, ExtractError> {
        if width == 0 || height == 0 {
            return Err(ExtractError::ImageDecode(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        if luma.len() != width * height {
            return Err(ExtractError::ImageDecode(format!(
                "sample count {} does not match {width}x{height}",
                luma.len()
            )));
        }
        Ok(Self {
            width,
            height,
            luma,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn luma(&self) -> &[u8] {
        &self.luma
    }
}
