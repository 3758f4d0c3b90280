//! Symbol decode orchestration: orientation, format/version information,
//! unmasking, bit extraction, error correction, and segment decoding.

use crate::decoder::bitstream::BitstreamExtractor;
use crate::decoder::blocks::{bits_to_codewords, deinterleave_and_correct};
use crate::decoder::format::FormatInfo;
use crate::decoder::function_mask::FunctionMask;
use crate::decoder::modes::decode_segments;
use crate::decoder::unmask::unmask;
use crate::decoder::version::VersionInfo;
use crate::models::{BitMatrix, DecodedSymbol, Version};

/// Mismatched diagnostic cells tolerated when checking finder placement.
const ORIENTATION_TOLERANCE: usize = 3;

/// Decode a sampled module grid, trying all four rotations whose finder
/// patterns land in the right corners. The error carries the most recent
/// stage failure for diagnostics.
pub fn decode_symbol(sampled: &BitMatrix) -> Result<DecodedSymbol, String> {
    let mut last_failure = String::from("no orientation places the finder patterns correctly");

    for oriented in candidate_orientations(sampled) {
        match decode_oriented(&oriented) {
            Ok(symbol) => return Ok(symbol),
            Err(failure) => last_failure = failure,
        }
    }

    Err(last_failure)
}

fn decode_oriented(matrix: &BitMatrix) -> Result<DecodedSymbol, String> {
    let dimension = matrix.width();
    let geometric_version = Version::from_dimension(dimension)
        .ok_or_else(|| format!("no QR version has dimension {dimension}"))?;

    // Symbols of version 7+ carry explicit version info; prefer it over
    // the geometric estimate when it decodes.
    let version = if dimension >= 45 {
        VersionInfo::extract(matrix)
            .and_then(Version::new)
            .unwrap_or(geometric_version)
    } else {
        geometric_version
    };
    if version.dimension() != dimension {
        return Err(format!(
            "version info says {} but the sampled grid is {dimension} modules wide",
            version.number()
        ));
    }

    let format = FormatInfo::extract(matrix)
        .ok_or_else(|| String::from("format information is unreadable"))?;
    log::debug!(
        "decoding v{} symbol, ec {:?}, mask {}",
        version.number(),
        format.ec_level,
        format.mask_pattern.bits()
    );

    let func = FunctionMask::new(version.number());
    let mut unmasked = matrix.clone();
    unmask(&mut unmasked, format.mask_pattern, &func);

    let bits = BitstreamExtractor::extract(&unmasked, &func);
    let codewords = bits_to_codewords(&bits);
    let data = deinterleave_and_correct(&codewords, version.number(), format.ec_level)
        .ok_or_else(|| String::from("error correction failed"))?;

    let (bytes, text) =
        decode_segments(&data, version.number()).ok_or_else(|| String::from("malformed segment stream"))?;
    if bytes.is_empty() {
        return Err(String::from("symbol carries an empty payload"));
    }

    Ok(DecodedSymbol {
        bytes,
        text,
        version,
        ec_level: format.ec_level,
        mask_pattern: format.mask_pattern,
    })
}

/// The rotations of the sampled grid whose finder patterns sit at the
/// top-left, top-right, and bottom-left corners.
fn candidate_orientations(matrix: &BitMatrix) -> Vec<BitMatrix> {
    let mut candidates = Vec::new();

    let r0 = matrix.clone();
    if has_finders_in_place(&r0) {
        candidates.push(r0);
    }
    let r90 = rotate90(matrix);
    if has_finders_in_place(&r90) {
        candidates.push(r90);
    }
    let r180 = rotate180(matrix);
    if has_finders_in_place(&r180) {
        candidates.push(r180);
    }
    let r270 = rotate270(matrix);
    if has_finders_in_place(&r270) {
        candidates.push(r270);
    }

    candidates
}

/// Check a handful of diagnostic cells of each finder pattern, allowing a
/// few sampling errors.
fn has_finders_in_place(matrix: &BitMatrix) -> bool {
    let dim = matrix.width();
    if dim < 21 || matrix.height() != dim {
        return false;
    }

    let finder_checks: [(usize, usize, bool); 7] = [
        (0, 0, true),
        (6, 0, true),
        (0, 6, true),
        (6, 6, true),
        (3, 3, true),
        (1, 1, false),
        (2, 2, true),
    ];
    let origins = [(0, 0), (dim - 7, 0), (0, dim - 7)];

    let mut mismatches = 0usize;
    for &(ox, oy) in &origins {
        for &(dx, dy, expected) in &finder_checks {
            if matrix.get(ox + dx, oy + dy) != expected {
                mismatches += 1;
                if mismatches > ORIENTATION_TOLERANCE {
                    return false;
                }
            }
        }
    }

    true
}

fn rotate90(matrix: &BitMatrix) -> BitMatrix {
    let n = matrix.width();
    let mut out = BitMatrix::new(n, n);
    for y in 0..n {
        for x in 0..n {
            out.set(n - 1 - y, x, matrix.get(x, y));
        }
    }
    out
}

fn rotate180(matrix: &BitMatrix) -> BitMatrix {
    let n = matrix.width();
    let mut out = BitMatrix::new(n, n);
    for y in 0..n {
        for x in 0..n {
            out.set(n - 1 - x, n - 1 - y, matrix.get(x, y));
        }
    }
    out
}

fn rotate270(matrix: &BitMatrix) -> BitMatrix {
    let n = matrix.width();
    let mut out = BitMatrix::new(n, n);
    for y in 0..n {
        for x in 0..n {
            out.set(y, n - 1 - x, matrix.get(x, y));
        }
    }
    out
}
