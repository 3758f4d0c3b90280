/// QR symbol version (Model 2, 1-40).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(u8);

impl Version {
    /// Validated constructor; Model 2 versions run 1-40.
    pub fn new(number: u8) -> Option<Self> {
        (1..=40).contains(&number).then_some(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Symbol side length in modules (21, 25, ... 177).
    pub fn dimension(&self) -> usize {
        17 + 4 * self.0 as usize
    }

    /// Version whose symbol is `dimension` modules wide, if any.
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        if dimension < 21 || (dimension - 17) % 4 != 0 {
            return None;
        }
        Self::new(((dimension - 17) / 4) as u8)
    }
}

/// Error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// ~7% recovery capacity
    L,
    /// ~15% recovery capacity
    M,
    /// ~25% recovery capacity
    Q,
    /// ~30% recovery capacity
    H,
}

impl ECLevel {
    /// Decode the two format-information indicator bits.
    ///
    /// The assignment is the ISO one (L=01, M=00, Q=11, H=10), not the
    /// "obvious" ordinal order.
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }

    /// Inverse of [`from_format_bits`](Self::from_format_bits).
    pub fn format_bits(&self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }
}

/// Data mask pattern (0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the module at (row, col) is masked, per the eight mask
    /// conditions of the symbology.
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        let (i, j) = (row, col);
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            _ => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        }
    }
}

/// Successfully decoded QR symbol.
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    /// Raw decoded payload bytes.
    pub bytes: Vec<u8>,
    /// Payload as text (lossy UTF-8 where the payload is not valid UTF-8).
    pub text: String,
    /// Symbol version.
    pub version: Version,
    /// Error correction level the symbol was encoded with.
    pub ec_level: ECLevel,
    /// Mask pattern that was applied to the data region.
    pub mask_pattern: MaskPattern,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_dimensions() {
        assert_eq!(Version::new(1).unwrap().dimension(), 21);
        assert_eq!(Version::new(7).unwrap().dimension(), 45);
        assert_eq!(Version::new(40).unwrap().dimension(), 177);
        assert!(Version::new(0).is_none());
        assert!(Version::new(41).is_none());
    }

    #[test]
    fn version_from_dimension() {
        assert_eq!(Version::from_dimension(21), Version::new(1));
        assert_eq!(Version::from_dimension(29), Version::new(3));
        assert!(Version::from_dimension(20).is_none());
        assert!(Version::from_dimension(23).is_none());
    }

    #[test]
    fn ec_level_bits_round_trip() {
        for level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            assert_eq!(ECLevel::from_format_bits(level.format_bits()), level);
        }
        assert_eq!(ECLevel::from_format_bits(0b01), ECLevel::L);
        assert_eq!(ECLevel::from_format_bits(0b00), ECLevel::M);
    }

    #[test]
    fn mask_pattern_zero() {
        let mask = MaskPattern::from_bits(0);
        assert!(mask.is_masked(0, 0));
        assert!(!mask.is_masked(0, 1));
        assert!(mask.is_masked(1, 1));
    }
}
