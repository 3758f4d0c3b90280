//! Segment decoding: mode indicators, character counts, and the per-mode
//! payload encodings.

/// The 45-character alphanumeric mode alphabet.
const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

const MODE_TERMINATOR: u8 = 0;
const MODE_NUMERIC: u8 = 1;
const MODE_ALPHANUMERIC: u8 = 2;
const MODE_BYTE: u8 = 4;
const MODE_ECI: u8 = 7;
const MODE_KANJI: u8 = 8;

/// Decode the data codewords of a symbol into raw bytes and text. Returns
/// `None` on a malformed segment stream.
pub fn decode_segments(data_codewords: &[u8], version: u8) -> Option<(Vec<u8>, String)> {
    let mut bits = Vec::with_capacity(data_codewords.len() * 8);
    for &byte in data_codewords {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 != 0);
        }
    }

    let mut reader = BitReader::new(&bits);
    let mut data = Vec::new();
    let mut content = String::new();

    loop {
        if reader.remaining() < 4 {
            break;
        }
        let mode = reader.read_bits(4)? as u8;

        match mode {
            MODE_TERMINATOR => break,
            MODE_NUMERIC => {
                let count = reader.read_bits(char_count_bits(mode, version))? as usize;
                let decoded = decode_numeric(&mut reader, count)?;
                data.extend_from_slice(decoded.as_bytes());
                content.push_str(&decoded);
            }
            MODE_ALPHANUMERIC => {
                let count = reader.read_bits(char_count_bits(mode, version))? as usize;
                let decoded = decode_alphanumeric(&mut reader, count)?;
                data.extend_from_slice(decoded.as_bytes());
                content.push_str(&decoded);
            }
            MODE_BYTE => {
                let count = reader.read_bits(char_count_bits(mode, version))? as usize;
                let mut bytes = Vec::with_capacity(count);
                for _ in 0..count {
                    bytes.push(reader.read_bits(8)? as u8);
                }
                content.push_str(&String::from_utf8_lossy(&bytes));
                data.extend_from_slice(&bytes);
            }
            MODE_ECI => {
                // parse the designator and assume UTF-8 for the payload
                let mut eci = reader.read_bits(8)?;
                if eci & 0x80 != 0 {
                    eci = ((eci & 0x7F) << 8) | reader.read_bits(8)?;
                    if eci & 0x4000 != 0 {
                        eci = ((eci & 0x3FFF) << 8) | reader.read_bits(8)?;
                    }
                }
                log::trace!("skipping ECI designator {eci}");
            }
            MODE_KANJI => {
                let count = reader.read_bits(char_count_bits(mode, version))? as usize;
                let sjis = decode_kanji(&mut reader, count)?;
                content.push_str(&String::from_utf8_lossy(&sjis));
                data.extend_from_slice(&sjis);
            }
            _ => return None,
        }
    }

    Some((data, content))
}

/// Character count field width per mode and version range.
pub fn char_count_bits(mode: u8, version: u8) -> usize {
    let band = if version <= 9 {
        0
    } else if version <= 26 {
        1
    } else {
        2
    };
    match mode {
        MODE_NUMERIC => [10, 12, 14][band],
        MODE_ALPHANUMERIC => [9, 11, 13][band],
        MODE_BYTE => [8, 16, 16][band],
        MODE_KANJI => [8, 10, 12][band],
        _ => 0,
    }
}

/// Digits packed three to 10 bits, with 7- and 4-bit tails.
fn decode_numeric(reader: &mut BitReader, count: usize) -> Option<String> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;

    while remaining >= 3 {
        let value = reader.read_bits(10)?;
        if value >= 1000 {
            return None;
        }
        out.push_str(&format!("{value:03}"));
        remaining -= 3;
    }
    if remaining == 2 {
        let value = reader.read_bits(7)?;
        if value >= 100 {
            return None;
        }
        out.push_str(&format!("{value:02}"));
    } else if remaining == 1 {
        let value = reader.read_bits(4)?;
        if value >= 10 {
            return None;
        }
        out.push_str(&format!("{value}"));
    }

    Some(out)
}

/// Character pairs packed to 11 bits, odd tail character in 6.
fn decode_alphanumeric(reader: &mut BitReader, count: usize) -> Option<String> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;

    while remaining >= 2 {
        let value = reader.read_bits(11)? as usize;
        let first = value / 45;
        let second = value % 45;
        if first >= 45 {
            return None;
        }
        out.push(ALPHANUMERIC_CHARS[first] as char);
        out.push(ALPHANUMERIC_CHARS[second] as char);
        remaining -= 2;
    }
    if remaining == 1 {
        let value = reader.read_bits(6)? as usize;
        if value >= 45 {
            return None;
        }
        out.push(ALPHANUMERIC_CHARS[value] as char);
    }

    Some(out)
}

/// 13-bit packed values expanded back to Shift-JIS byte pairs.
fn decode_kanji(reader: &mut BitReader, count: usize) -> Option<Vec<u8>> {
    let mut sjis = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let value = reader.read_bits(13)? as u16;
        let mut assembled = ((value / 0xC0) << 8) | (value % 0xC0);
        if assembled < 0x1F00 {
            assembled += 0x8140;
        } else {
            assembled += 0xC140;
        }
        sjis.push((assembled >> 8) as u8);
        sjis.push((assembled & 0xFF) as u8);
    }
    Some(sjis)
}

pub struct BitReader<'a> {
    bits: &'a [bool],
    idx: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a [bool]) -> Self {
        Self { bits, idx: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.idx)
    }

    pub fn read_bits(&mut self, n: usize) -> Option<u32> {
        if self.idx + n > self.bits.len() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | (self.bits[self.idx] as u32);
            self.idx += 1;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BitWriter {
        bits: Vec<bool>,
    }

    impl BitWriter {
        fn new() -> Self {
            Self { bits: Vec::new() }
        }

        fn write(&mut self, value: u32, n: usize) {
            for i in (0..n).rev() {
                self.bits.push((value >> i) & 1 != 0);
            }
        }

        fn into_codewords(mut self) -> Vec<u8> {
            while self.bits.len() % 8 != 0 {
                self.bits.push(false);
            }
            self.bits
                .chunks(8)
                .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
                .collect()
        }
    }

    #[test]
    fn decodes_byte_segment() {
        let payload = b"upi://pay?pa=a@b";
        let mut w = BitWriter::new();
        w.write(MODE_BYTE as u32, 4);
        w.write(payload.len() as u32, 8);
        for &b in payload {
            w.write(b as u32, 8);
        }
        w.write(0, 4);

        let (data, content) = decode_segments(&w.into_codewords(), 1).unwrap();
        assert_eq!(data, payload);
        assert_eq!(content, "upi://pay?pa=a@b");
    }

    #[test]
    fn decodes_numeric_segment() {
        // "01234567": 012 345 in 10-bit groups, 67 in 7 bits
        let mut w = BitWriter::new();
        w.write(MODE_NUMERIC as u32, 4);
        w.write(8, 10);
        w.write(12, 10);
        w.write(345, 10);
        w.write(67, 7);
        w.write(0, 4);

        let (_, content) = decode_segments(&w.into_codewords(), 1).unwrap();
        assert_eq!(content, "01234567");
    }

    #[test]
    fn decodes_alphanumeric_segment() {
        // "AC-42": pairs (A,C) (-,4), tail 2
        let mut w = BitWriter::new();
        w.write(MODE_ALPHANUMERIC as u32, 4);
        w.write(5, 9);
        w.write(10 * 45 + 12, 11);
        w.write(41 * 45 + 4, 11);
        w.write(2, 6);
        w.write(0, 4);

        let (_, content) = decode_segments(&w.into_codewords(), 1).unwrap();
        assert_eq!(content, "AC-42");
    }

    #[test]
    fn mixed_segments_concatenate() {
        let mut w = BitWriter::new();
        w.write(MODE_NUMERIC as u32, 4);
        w.write(3, 10);
        w.write(250, 10);
        w.write(MODE_BYTE as u32, 4);
        w.write(3, 8);
        for &b in b"@ok" {
            w.write(b as u32, 8);
        }
        w.write(0, 4);

        let (_, content) = decode_segments(&w.into_codewords(), 1).unwrap();
        assert_eq!(content, "250@ok");
    }

    #[test]
    fn overlong_numeric_value_is_rejected() {
        // a 10-bit group holding 1000 is not a valid digit triple
        let mut w = BitWriter::new();
        w.write(MODE_NUMERIC as u32, 4);
        w.write(3, 10);
        w.write(1000, 10);
        w.write(0, 4);

        assert!(decode_segments(&w.into_codewords(), 1).is_none());
    }

    #[test]
    fn count_field_widths() {
        assert_eq!(char_count_bits(MODE_NUMERIC, 1), 10);
        assert_eq!(char_count_bits(MODE_NUMERIC, 27), 14);
        assert_eq!(char_count_bits(MODE_ALPHANUMERIC, 10), 11);
        assert_eq!(char_count_bits(MODE_BYTE, 9), 8);
        assert_eq!(char_count_bits(MODE_BYTE, 10), 16);
        assert_eq!(char_count_bits(MODE_KANJI, 1), 8);
        assert_eq!(char_count_bits(MODE_KANJI, 26), 10);
        assert_eq!(char_count_bits(MODE_KANJI, 40), 12);
    }

    #[test]
    fn truncated_stream_fails() {
        // byte mode promising 10 bytes with only 2 present
        let mut w = BitWriter::new();
        w.write(MODE_BYTE as u32, 4);
        w.write(10, 8);
        w.write(b'a' as u32, 8);
        w.write(b'b' as u32, 8);

        assert!(decode_segments(&w.into_codewords(), 1).is_none());
    }
}
