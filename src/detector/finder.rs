//! Finder pattern search.
//!
//! Scans each row for the 1:1:3:1:1 black/white run signature of a finder
//! pattern, confirms every horizontal hit with a vertical re-scan through its
//! center, and merges duplicate hits from adjacent rows.

use crate::models::{BitMatrix, Point};

/// One located finder pattern candidate.
#[derive(Debug, Clone, Copy)]
pub struct FinderPattern {
    pub center: Point,
    /// Estimated module size in pixels, from the 7-module pattern width.
    pub module_size: f32,
}

impl FinderPattern {
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
        }
    }
}

/// Per-element tolerance when comparing run lengths against 1:1:3:1:1.
const RATIO_TOLERANCE: f32 = 0.5;

/// Candidates closer than this merge into one pattern.
const MERGE_DIST: f32 = 5.0;

const MAX_PATTERNS_PER_ROW: usize = 5;

pub struct FinderDetector;

impl FinderDetector {
    /// Locate finder pattern candidates in a binary image.
    pub fn detect(matrix: &BitMatrix) -> Vec<FinderPattern> {
        let width = matrix.width();
        let height = matrix.height();
        let mut candidates = Vec::new();

        for y in 0..height {
            if !Self::has_significant_edges(matrix, y, width) {
                continue;
            }
            Self::scan_row(matrix, y, width, &mut candidates);
        }

        let merged = Self::merge_candidates(candidates);
        log::trace!("finder scan produced {} merged candidates", merged.len());
        merged
    }

    /// Cheap pre-check: a row without a handful of edge transitions cannot
    /// hold a finder pattern.
    fn has_significant_edges(matrix: &BitMatrix, y: usize, width: usize) -> bool {
        let sample_step = 4;
        let mut transitions = 0;
        let mut prev = matrix.get(0, y);

        for x in (sample_step..width).step_by(sample_step) {
            let color = matrix.get(x, y);
            if color != prev {
                transitions += 1;
                prev = color;
                if transitions >= 3 {
                    return true;
                }
            }
        }

        transitions >= 2
    }

    fn scan_row(matrix: &BitMatrix, y: usize, width: usize, out: &mut Vec<FinderPattern>) {
        let mut run_lengths: Vec<usize> = Vec::new();
        let mut run_colors: Vec<bool> = Vec::new();
        let mut run_start = 0usize;
        let mut current = matrix.get(0, y);
        let mut found_in_row = 0usize;

        for x in 1..width {
            let color = matrix.get(x, y);
            if color == current {
                continue;
            }

            run_lengths.push(x - run_start);
            run_colors.push(current);
            run_start = x;
            current = color;

            let n = run_colors.len();
            if n < 5 {
                continue;
            }
            let colors = &run_colors[n - 5..];
            let lengths = &run_lengths[n - 5..];

            // black-white-black-white-black, ratios first checked in cheap
            // integer arithmetic before the floating point validation
            if colors[0] && !colors[1] && colors[2] && !colors[3] && colors[4]
                && Self::quick_ratio_check(lengths)
            {
                if let Some(pattern) = Self::confirm_candidate(matrix, lengths, x, y) {
                    out.push(pattern);
                    found_in_row += 1;
                    if found_in_row >= MAX_PATTERNS_PER_ROW {
                        return;
                    }
                }
            }
        }
    }

    /// Integer prefilter on the five run lengths.
    fn quick_ratio_check(lengths: &[usize]) -> bool {
        let (b1, w1, b2, w2, b3) = (lengths[0], lengths[1], lengths[2], lengths[3], lengths[4]);
        let total = b1 + w1 + b2 + w2 + b3;

        // 7 modules at ~3px minimum; anything smaller is noise
        if total < 21 {
            return false;
        }

        // center black should be roughly 3x the outer runs
        let outer_min = b1.min(b3);
        if b2 < outer_min * 2 || b2 > outer_min * 5 {
            return false;
        }

        let outer_avg = (b1 + b3 + w1 + w2) / 4;
        let w1_ok = w1 >= outer_avg / 2 && w1 <= outer_avg * 2;
        let w2_ok = w2 >= outer_avg / 2 && w2 <= outer_avg * 2;
        w1_ok && w2_ok
    }

    /// Full 1:1:3:1:1 validation; `None` when a run deviates past tolerance.
    fn pattern_unit(lengths: &[usize; 5]) -> Option<f32> {
        let total: usize = lengths.iter().sum();
        let unit = total as f32 / 7.0;

        let expected = [1.0, 1.0, 3.0, 1.0, 1.0];
        for (len, exp) in lengths.iter().zip(expected) {
            if (*len as f32 / unit - exp).abs() > RATIO_TOLERANCE {
                return None;
            }
        }
        Some(unit)
    }

    /// Validate the horizontal run ratios, then re-scan vertically through
    /// the candidate center to confirm the pattern in both axes and refine
    /// the center's y coordinate.
    fn confirm_candidate(
        matrix: &BitMatrix,
        lengths: &[usize],
        end_x: usize,
        y: usize,
    ) -> Option<FinderPattern> {
        let runs: [usize; 5] = lengths.try_into().ok()?;
        let h_unit = Self::pattern_unit(&runs)?;

        let center_x = end_x as f32 - runs[4] as f32 - runs[3] as f32 - runs[2] as f32 / 2.0;
        let (center_y, v_unit) = Self::cross_check_vertical(matrix, center_x as usize, y)?;

        // the two axes should agree on module size
        let ratio = h_unit / v_unit;
        if !(0.5..=2.0).contains(&ratio) {
            return None;
        }

        Some(FinderPattern::new(
            center_x,
            center_y,
            (h_unit + v_unit) / 2.0,
        ))
    }

    /// Walk up and down from (cx, start_y) collecting the five vertical runs
    /// and validate them against 1:1:3:1:1.
    fn cross_check_vertical(matrix: &BitMatrix, cx: usize, start_y: usize) -> Option<(f32, f32)> {
        if !matrix.get(cx, start_y) {
            return None;
        }
        let height = matrix.height();
        let mut runs = [0usize; 5];

        // center black, upward then downward
        let mut y = start_y as isize;
        while y >= 0 && matrix.get(cx, y as usize) {
            runs[2] += 1;
            y -= 1;
        }
        if y < 0 {
            return None;
        }
        let max_run = runs[2] * 2;

        while y >= 0 && !matrix.get(cx, y as usize) && runs[1] <= max_run {
            runs[1] += 1;
            y -= 1;
        }
        while y >= 0 && matrix.get(cx, y as usize) && runs[0] <= max_run {
            runs[0] += 1;
            y -= 1;
        }

        let mut y = start_y + 1;
        while y < height && matrix.get(cx, y) {
            runs[2] += 1;
            y += 1;
        }
        if y >= height {
            return None;
        }
        while y < height && !matrix.get(cx, y) && runs[3] <= max_run {
            runs[3] += 1;
            y += 1;
        }
        while y < height && matrix.get(cx, y) && runs[4] <= max_run {
            runs[4] += 1;
            y += 1;
        }
        let bottom = y;

        let unit = Self::pattern_unit(&runs)?;
        let center_y = bottom as f32 - runs[4] as f32 - runs[3] as f32 - runs[2] as f32 / 2.0;
        Some((center_y, unit))
    }

    fn merge_candidates(candidates: Vec<FinderPattern>) -> Vec<FinderPattern> {
        let mut merged: Vec<FinderPattern> = Vec::new();

        for candidate in candidates {
            let mut absorbed = false;
            for existing in &mut merged {
                let dx = candidate.center.x - existing.center.x;
                let dy = candidate.center.y - existing.center.y;
                if dx * dx + dy * dy < MERGE_DIST * MERGE_DIST {
                    *existing = FinderPattern::new(
                        (existing.center.x + candidate.center.x) / 2.0,
                        (existing.center.y + candidate.center.y) / 2.0,
                        (existing.module_size + candidate.module_size) / 2.0,
                    );
                    absorbed = true;
                    break;
                }
            }
            if !absorbed {
                merged.push(candidate);
            }
        }

        merged
    }
}
