//! Format information: 5 data bits (EC level + mask pattern) protected by
//! BCH(15,5), masked with a fixed pattern, stored twice in the symbol.

use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// XOR mask applied to the 15-bit codeword so format info is never all
/// zeros.
const FORMAT_MASK: u16 = 0x5412;

/// BCH(15,5) generator polynomial.
const GENERATOR: u16 = 0x537;

#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    pub ec_level: ECLevel,
    pub mask_pattern: MaskPattern,
}

impl FormatInfo {
    /// Read both stored copies and decode whichever survives error
    /// correction; the copy by the top-left finder is tried first.
    pub fn extract(matrix: &BitMatrix) -> Option<Self> {
        if matrix.width() < 21 {
            return None;
        }
        let primary = Self::read_top_left(matrix);
        let secondary = Self::read_split(matrix);

        Self::decode(primary).or_else(|| Self::decode(secondary))
    }

    /// Copy around the top-left finder, most significant bit first.
    fn read_top_left(matrix: &BitMatrix) -> u16 {
        let mut bits = 0u16;
        for col in 0..6 {
            bits = (bits << 1) | (matrix.get(col, 8) as u16);
        }
        bits = (bits << 1) | (matrix.get(7, 8) as u16);
        bits = (bits << 1) | (matrix.get(8, 8) as u16);
        bits = (bits << 1) | (matrix.get(8, 7) as u16);
        for row in (0..6).rev() {
            bits = (bits << 1) | (matrix.get(8, row) as u16);
        }
        bits
    }

    /// Second copy, split between the other two finders.
    fn read_split(matrix: &BitMatrix) -> u16 {
        let size = matrix.width();
        let mut bits = 0u16;
        for row in ((size - 7)..size).rev() {
            bits = (bits << 1) | (matrix.get(8, row) as u16);
        }
        for col in (size - 8)..size {
            bits = (bits << 1) | (matrix.get(col, 8) as u16);
        }
        bits
    }

    /// Decode a masked 15-bit codeword, tolerating up to 3 bit errors by
    /// comparing against all 32 valid codewords.
    fn decode(read_bits: u16) -> Option<Self> {
        let mut best: Option<(u16, u32)> = None;
        for data in 0..32u16 {
            let candidate = Self::encode_data(data) ^ FORMAT_MASK;
            let distance = (candidate ^ read_bits).count_ones();
            if distance > 3 {
                continue;
            }
            best = match best {
                Some((_, d)) if distance > d => best,
                Some((_, d)) if distance == d => return None, // ambiguous
                _ => Some((data, distance)),
            };
        }

        let (data, _) = best?;
        let ec_level = ECLevel::from_format_bits(((data >> 3) & 0x03) as u8);
        let mask_pattern = MaskPattern::from_bits((data & 0x07) as u8);
        Some(Self {
            ec_level,
            mask_pattern,
        })
    }

    /// Masked 15-bit codeword for an EC level and mask pattern, as it
    /// appears in the symbol.
    pub fn encode(ec_level: ECLevel, mask_pattern: MaskPattern) -> u16 {
        let data = ((ec_level.format_bits() as u16) << 3) | mask_pattern.bits() as u16;
        Self::encode_data(data) ^ FORMAT_MASK
    }

    /// 5 data bits plus their 10-bit BCH remainder, unmasked.
    fn encode_data(data: u16) -> u16 {
        let mut value = (data as u32) << 10;
        for i in (0..5).rev() {
            if value & (1 << (i + 10)) != 0 {
                value ^= (GENERATOR as u32) << i;
            }
        }
        ((data << 10) | value as u16) & 0x7FFF
    }
}
