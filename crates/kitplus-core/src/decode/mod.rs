//! Image decoding and re-rasterization.
//!
//! This module provides functionality for:
//! - Decoding PNG, JPEG, GIF, TIFF, BMP and ICO data with EXIF orientation applied
//! - Resizing and re-rasterizing bitmaps at a device pixel density
//!
//! # Examples
//!
//! ```ignore
//! use kitplus_core::decode::{decode, resize_with_percentage};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode(&bytes).unwrap().with_scale(3.0);
//! let half = resize_with_percentage(&image, 0.5).unwrap();
//! println!("{}x{} px", half.width, half.height);
//! ```

mod codec;
mod resize;
mod types;

pub use codec::{decode, decode_file, decode_no_orientation, get_orientation};
pub(crate) use resize::flatten_alpha;
pub use resize::{
    rasterize, resize, resize_to_dimension, resize_with_percentage, scale_by_factor,
    scale_preserving_aspect_ratio, ContentMode, ResizeError,
};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, Size};
