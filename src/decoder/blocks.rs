//! Codeword assembly: bitstream to bytes, block de-interleaving, and
//! Reed-Solomon correction per block.

use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::decoder::tables::ec_block_info;
use crate::models::ECLevel;

/// Pack the extracted bitstream into codewords, most significant bit
/// first. Trailing remainder bits are dropped.
pub fn bits_to_codewords(bits: &[bool]) -> Vec<u8> {
    let mut codewords = Vec::with_capacity(bits.len() / 8);
    let mut idx = 0;
    while idx + 8 <= bits.len() {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | (bits[idx] as u8);
            idx += 1;
        }
        codewords.push(byte);
    }
    codewords
}

/// Undo block interleaving, run error correction on every block, and
/// return the concatenated data codewords. Short blocks come before long
/// ones in the block ordering.
pub fn deinterleave_and_correct(
    codewords: &[u8],
    version: u8,
    ec_level: ECLevel,
) -> Option<Vec<u8>> {
    let info = ec_block_info(version, ec_level)?;
    let total = codewords.len();
    let ecc_total = info.num_blocks * info.ecc_per_block;
    if total < ecc_total {
        return None;
    }
    let data_total = total - ecc_total;
    if data_total == 0 {
        return None;
    }

    let num_long_blocks = data_total % info.num_blocks;
    let num_short_blocks = info.num_blocks - num_long_blocks;
    let short_len = data_total / info.num_blocks;
    let long_len = short_len + 1;

    let mut blocks: Vec<Vec<u8>> = (0..info.num_blocks)
        .map(|_| Vec::with_capacity(long_len + info.ecc_per_block))
        .collect();

    let mut idx = 0;
    for i in 0..long_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            let block_len = if b < num_short_blocks {
                short_len
            } else {
                long_len
            };
            if i < block_len {
                if idx >= total {
                    return None;
                }
                block.push(codewords[idx]);
                idx += 1;
            }
        }
    }

    for _ in 0..info.ecc_per_block {
        for block in blocks.iter_mut() {
            if idx >= total {
                return None;
            }
            block.push(codewords[idx]);
            idx += 1;
        }
    }

    let rs = ReedSolomonDecoder::new(info.ecc_per_block);
    let mut data_out = Vec::with_capacity(data_total);
    for (b, block) in blocks.iter_mut().enumerate() {
        if let Err(reason) = rs.decode(block) {
            log::debug!("block {b} failed error correction: {reason}");
            return None;
        }
        let data_len = if b < num_short_blocks {
            short_len
        } else {
            long_len
        };
        data_out.extend_from_slice(&block[..data_len]);
    }

    Some(data_out)
}
