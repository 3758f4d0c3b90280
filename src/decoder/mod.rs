//! Symbol decoding: from a sampled module grid to payload bytes.

pub mod bitstream;
pub mod blocks;
pub mod format;
pub mod function_mask;
pub mod modes;
pub mod reed_solomon;
pub mod sampling;
pub mod symbol;
pub mod tables;
pub mod unmask;
pub mod version;

pub use format::FormatInfo;
pub use function_mask::FunctionMask;
pub use sampling::{build_transform, sample_modules, PerspectiveTransform};
pub use symbol::decode_symbol;
