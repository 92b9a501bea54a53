//! Size-bounded image compression.
//!
//! This module provides functionality for:
//! - Re-encoding an image as JPEG until the bytes fit a target size
//! - Shrinking an image until its footprint fits a memory budget, off the
//!   foreground thread
//!
//! # Examples
//!
//! ```ignore
//! use kitplus_core::compress::{compress_to, CompressionSchedule};
//!
//! let result = compress_to(&photo, 2.0, 0.9, 3.0).unwrap();
//! println!("{} bytes at quality {}", result.encoded.len(), result.quality);
//! ```

mod budget;
mod fit;

pub use budget::{
    compress_to, compress_with, CompressError, CompressedImage, CompressionConfig,
    CompressionRequest, CompressionSchedule, BYTES_PER_MB, FLOOR_PROBE_QUALITY, QUALITY_FLOOR,
};
pub use fit::{fit_to_budget, original_size_mb, resize_to_fit_budget, SizeSource};
