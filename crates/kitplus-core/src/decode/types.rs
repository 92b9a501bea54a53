//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row strides are padded to this many bytes when estimating bitmap memory.
const ROW_ALIGNMENT: usize = 16;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input was empty.
    #[error("No image data to decode")]
    EmptyInput,

    /// The data is not in a format any enabled codec recognizes.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Base64 text could not be decoded.
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The raw EXIF tag value.
    pub fn exif_value(self) -> u16 {
        self as u16
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Logical size in points (pixels divided by the image scale).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Multiply both axes by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// A decoded bitmap with RGBA pixel data and a device pixel density.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixels per logical point.
    pub scale: f64,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Empty when the image has no backing bitmap.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new image at scale 1.0 with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert!(
            pixels.is_empty() || pixels.len() == (width as usize) * (height as usize) * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            scale: 1.0,
            pixels,
        }
    }

    /// An image that reports a size but has no pixel buffer.
    pub fn without_pixels(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            pixels: Vec::new(),
        }
    }

    /// Builder-style scale override.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Create a DecodedImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage, scale: f64) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            scale,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    ///
    /// Returns `None` when the pixel buffer is missing or inconsistent.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        if !self.has_pixel_data() {
            return None;
        }
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Logical size in points.
    pub fn size(&self) -> Size {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Size::new(self.width as f64 / scale, self.height as f64 / scale)
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// True when a complete RGBA buffer backs the image.
    pub fn has_pixel_data(&self) -> bool {
        !self.is_empty() && self.pixels.len() == self.pixel_count() as usize * 4
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// True when every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 255)
    }

    /// Row stride of a 32-bit bitmap, padded to 16 bytes.
    pub fn bytes_per_row(&self) -> usize {
        let raw = self.width as usize * 4;
        raw.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
    }

    /// Estimated in-memory footprint of the bitmap.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.height as usize * self.bytes_per_row()
    }
}
