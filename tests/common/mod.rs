//! Test-side QR encoder: builds real byte-mode symbols at error correction
//! level L and renders them to PNG, so the pipeline can be exercised end
//! to end without binary fixtures.

use qrupi::decoder::bitstream::data_module_positions;
use qrupi::decoder::format::FormatInfo;
use qrupi::decoder::function_mask::{alignment_pattern_positions, FunctionMask};
use qrupi::models::{BitMatrix, ECLevel, MaskPattern};

/// (total codewords, ecc codewords) for level L, single block versions.
const LEVEL_L_BLOCKS: [(usize, usize); 3] = [(26, 7), (44, 10), (70, 15)];

/// Encode `payload` as a byte-mode symbol of the given version (1..=3)
/// at level L with mask pattern 0. Panics if the payload does not fit.
pub fn encode_symbol(payload: &[u8], version: u8) -> BitMatrix {
    assert!((1..=3).contains(&version), "only single-block versions supported");
    let (total, ecc) = LEVEL_L_BLOCKS[version as usize - 1];
    let data_capacity = total - ecc;

    let data = assemble_data_codewords(payload, data_capacity);
    let mut codewords = data.clone();
    codewords.extend(rs_ecc(&data, ecc));
    assert_eq!(codewords.len(), total);

    place_codewords(&codewords, version)
}

/// Render a module matrix to PNG bytes, 8 pixels per module with a
/// 4-module quiet zone.
pub fn render_png(matrix: &BitMatrix) -> Vec<u8> {
    let scale = 8usize;
    let quiet = 4usize;
    let dim = matrix.width();
    let side = (dim + 2 * quiet) * scale;

    let mut img = image::GrayImage::from_pixel(side as u32, side as u32, image::Luma([255u8]));
    for my in 0..dim {
        for mx in 0..dim {
            if !matrix.get(mx, my) {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = ((mx + quiet) * scale + dx) as u32;
                    let py = ((my + quiet) * scale + dy) as u32;
                    img.put_pixel(px, py, image::Luma([0u8]));
                }
            }
        }
    }

    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .expect("png encode");
    bytes
}

/// Convenience: encode a payload and render it in one go.
pub fn encode_png(payload: &[u8], version: u8) -> Vec<u8> {
    render_png(&encode_symbol(payload, version))
}

/// Byte-mode segment, terminator, and the alternating pad bytes.
fn assemble_data_codewords(payload: &[u8], data_capacity: usize) -> Vec<u8> {
    fn write(bits: &mut Vec<bool>, value: u32, n: usize) {
        for i in (0..n).rev() {
            bits.push((value >> i) & 1 != 0);
        }
    }

    let mut bits: Vec<bool> = Vec::new();
    write(&mut bits, 0b0100, 4);
    write(&mut bits, payload.len() as u32, 8);
    for &b in payload {
        write(&mut bits, b as u32, 8);
    }

    let capacity_bits = data_capacity * 8;
    assert!(bits.len() + 4 <= capacity_bits, "payload too long for version");
    write(&mut bits, 0, 4); // terminator
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut codewords: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect();

    let pad = [0xEC, 0x11];
    let mut i = 0;
    while codewords.len() < data_capacity {
        codewords.push(pad[i % 2]);
        i += 1;
    }
    codewords
}

/// GF(256) multiply, primitive polynomial 0x11D.
fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= 0x1D;
        }
        b >>= 1;
    }
    product
}

/// Reed-Solomon ECC bytes for one block; generator roots alpha^0 upward.
fn rs_ecc(data: &[u8], num_ecc: usize) -> Vec<u8> {
    // generator = product of (x - alpha^i), ascending coefficients
    let mut generator = vec![1u8];
    let mut root = 1u8; // alpha^0
    for _ in 0..num_ecc {
        let mut next = vec![0u8; generator.len() + 1];
        for (j, &coeff) in generator.iter().enumerate() {
            next[j] ^= gf_mul(coeff, root);
            next[j + 1] ^= coeff;
        }
        generator = next;
        root = gf_mul(root, 2);
    }

    // synthetic division of data * x^num_ecc by the generator
    let mut remainder = vec![0u8; num_ecc];
    for &byte in data {
        let factor = byte ^ remainder[num_ecc - 1];
        for j in (1..num_ecc).rev() {
            remainder[j] = remainder[j - 1] ^ gf_mul(generator[j], factor);
        }
        remainder[0] = gf_mul(generator[0], factor);
    }

    remainder.reverse();
    remainder
}

/// Draw function patterns, format info, and the masked data modules.
fn place_codewords(codewords: &[u8], version: u8) -> BitMatrix {
    let size = 17 + 4 * version as usize;
    let mut matrix = BitMatrix::new(size, size);

    draw_finder(&mut matrix, 0, 0);
    draw_finder(&mut matrix, size - 7, 0);
    draw_finder(&mut matrix, 0, size - 7);

    for i in 8..size - 8 {
        matrix.set(i, 6, i % 2 == 0);
        matrix.set(6, i, i % 2 == 0);
    }

    let align = alignment_pattern_positions(version);
    for &cx in &align {
        for &cy in &align {
            let in_tl = cx <= 8 && cy <= 8;
            let in_tr = cx >= size - 9 && cy <= 8;
            let in_bl = cx <= 8 && cy >= size - 9;
            if in_tl || in_tr || in_bl {
                continue;
            }
            draw_alignment(&mut matrix, cx, cy);
        }
    }

    // dark module
    matrix.set(8, size - 8, true);

    let mask = MaskPattern::from_bits(0);
    draw_format(&mut matrix, FormatInfo::encode(ECLevel::L, mask));

    let func = FunctionMask::new(version);
    let positions = data_module_positions(&func);
    for (i, &(x, y)) in positions.iter().enumerate() {
        let bit = if i < codewords.len() * 8 {
            (codewords[i / 8] >> (7 - i % 8)) & 1 != 0
        } else {
            false // remainder bits
        };
        matrix.set(x, y, bit ^ mask.is_masked(y, x));
    }

    matrix
}

fn draw_finder(matrix: &mut BitMatrix, ox: usize, oy: usize) {
    for my in 0..7 {
        for mx in 0..7 {
            let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
            let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
            matrix.set(ox + mx, oy + my, ring || core);
        }
    }
}

fn draw_alignment(matrix: &mut BitMatrix, cx: usize, cy: usize) {
    for dy in 0..5i32 {
        for dx in 0..5i32 {
            let edge = dx == 0 || dx == 4 || dy == 0 || dy == 4;
            let center = dx == 2 && dy == 2;
            let x = (cx as i32 - 2 + dx) as usize;
            let y = (cy as i32 - 2 + dy) as usize;
            matrix.set(x, y, edge || center);
        }
    }
}

/// Both format info copies, bit 0 least significant.
fn draw_format(matrix: &mut BitMatrix, codeword: u16) {
    let size = matrix.width();
    let bit = |i: usize| (codeword >> i) & 1 != 0;

    for i in 0..6 {
        matrix.set(8, i, bit(i));
    }
    matrix.set(8, 7, bit(6));
    matrix.set(8, 8, bit(7));
    matrix.set(7, 8, bit(8));
    for i in 9..15 {
        matrix.set(14 - i, 8, bit(i));
    }

    for i in 0..8 {
        matrix.set(size - 1 - i, 8, bit(i));
    }
    for i in 8..15 {
        matrix.set(8, size - 15 + i, bit(i));
    }
}
