//! Data bit extraction along the standard zigzag traversal.

use crate::decoder::function_mask::FunctionMask;
use crate::models::BitMatrix;

pub struct BitstreamExtractor;

impl BitstreamExtractor {
    /// Read all data modules in placement order: column pairs from the
    /// right edge, alternating upward and downward, skipping the vertical
    /// timing column.
    pub fn extract(matrix: &BitMatrix, func: &FunctionMask) -> Vec<bool> {
        data_module_positions(func)
            .into_iter()
            .map(|(x, y)| matrix.get(x, y))
            .collect()
    }
}

/// The (x, y) of every data module in traversal order. Encoders place
/// codeword bits along exactly this sequence.
pub fn data_module_positions(func: &FunctionMask) -> Vec<(usize, usize)> {
    let dimension = func.size();
    let mut positions = Vec::with_capacity(func.data_modules_count());

    let mut upward = true;
    let mut col = dimension as i32 - 1;

    while col > 0 {
        if col == 6 {
            col -= 1;
            continue;
        }

        let rows: Box<dyn Iterator<Item = usize>> = if upward {
            Box::new((0..dimension).rev())
        } else {
            Box::new(0..dimension)
        };

        for row in rows {
            for c in [col, col - 1] {
                let x = c as usize;
                if !func.is_function(x, row) {
                    positions.push((x, row));
                }
            }
        }

        upward = !upward;
        col -= 2;
    }

    positions
}
