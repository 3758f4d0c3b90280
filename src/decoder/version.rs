//! Version information: 6 data bits protected by BCH(18,6), stored twice
//! in symbols of version 7 and up.

use crate::models::BitMatrix;

/// BCH(18,6) generator polynomial.
const GENERATOR: u32 = 0x1F25;

pub struct VersionInfo;

impl VersionInfo {
    /// Read the two version blocks of a symbol with dimension >= 45 and
    /// decode whichever survives error correction.
    pub fn extract(matrix: &BitMatrix) -> Option<u8> {
        if matrix.width() < 45 {
            return None;
        }
        let top_right = Self::read_top_right(matrix);
        let bottom_left = Self::read_bottom_left(matrix);

        Self::decode(top_right).or_else(|| Self::decode(bottom_left))
    }

    /// 6x3 block left of the top-right finder, bit 0 first.
    fn read_top_right(matrix: &BitMatrix) -> u32 {
        let size = matrix.width();
        let mut bits = 0u32;
        for i in 0..18 {
            let x = size - 11 + i % 3;
            let y = i / 3;
            bits |= (matrix.get(x, y) as u32) << i;
        }
        bits
    }

    /// 3x6 block above the bottom-left finder, mirrored layout.
    fn read_bottom_left(matrix: &BitMatrix) -> u32 {
        let size = matrix.width();
        let mut bits = 0u32;
        for i in 0..18 {
            let x = i / 3;
            let y = size - 11 + i % 3;
            bits |= (matrix.get(x, y) as u32) << i;
        }
        bits
    }

    /// Match against every valid codeword, tolerating up to 3 bit errors.
    fn decode(read_bits: u32) -> Option<u8> {
        let mut best: Option<(u8, u32)> = None;
        for version in 7..=40u8 {
            let distance = (Self::encode(version) ^ read_bits).count_ones();
            if distance > 3 {
                continue;
            }
            best = match best {
                Some((_, d)) if distance >= d => best,
                _ => Some((version, distance)),
            };
        }
        best.map(|(v, _)| v)
    }

    /// 6 version bits plus their 12-bit BCH remainder.
    pub fn encode(version: u8) -> u32 {
        let mut value = (version as u32) << 12;
        for i in (0..6).rev() {
            if value & (1 << (i + 12)) != 0 {
                value ^= GENERATOR << i;
            }
        }
        ((version as u32) << 12) | (value & 0xFFF)
    }
}
