//! Symbol location: binarization, finder pattern search, and corner
//! grouping. The output of this stage is a set of [`OrderedCorners`]
//! candidates for the decoder to try.

pub mod binarize;
pub mod finder;
pub mod grouping;

pub use binarize::{adaptive_binarize, otsu_binarize};
pub use finder::{FinderDetector, FinderPattern};
pub use grouping::{group_finder_patterns, order_finder_patterns, OrderedCorners};
