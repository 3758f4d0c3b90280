pub mod grid;
pub mod matrix;
pub mod point;
pub mod symbol;

pub use grid::PixelGrid;
pub use matrix::BitMatrix;
pub use point::Point;
pub use symbol::{DecodedSymbol, ECLevel, MaskPattern, Version};
