//! Image encoding.
//!
//! This module provides functionality for:
//! - Encoding images to JPEG (with quality) and PNG
//! - Encoding to any codec-backed uniform type identifier
//! - Writing the EXIF orientation tag into JPEG output
//! - Base64 transport of encoded images
//!
//! # Examples
//!
//! ```ignore
//! use kitplus_core::encode::{to_base64, ImageFormat};
//!
//! let text = to_base64(&image, ImageFormat::Jpeg(0.8)).unwrap();
//! println!("{} base64 chars", text.len());
//! ```

mod base64_text;
mod exif;
mod format;
mod jpeg;

pub use base64_text::{from_base64, to_base64};
pub use format::{encode, encode_as, to_jpeg_data, EncodeOptions, ImageFormat, ImageType};
pub use jpeg::{encode_jpeg, encode_png, jpeg_quality, EncodeError};
