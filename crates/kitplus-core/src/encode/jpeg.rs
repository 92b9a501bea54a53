//! JPEG and PNG encoding.
//!
//! Qualities are expressed as `0.0..=1.0` and mapped onto the encoder's
//! `1..=100` scale. JPEG has no alpha channel, so translucent pixels are
//! composited onto black before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use super::ImageType;
use crate::decode::{flatten_alpha, DecodedImage};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The image has no backing bitmap.
    #[error("Image has no pixel data")]
    NoPixelData,

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// No encoder is available for the requested type.
    #[error("No encoder available for {0:?}")]
    UnsupportedType(ImageType),

    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Map a `0.0..=1.0` quality onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let scaled = (quality.clamp(0.0, 1.0) * 100.0).round();
    (scaled as u8).clamp(1, 100)
}

/// Encode an image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - Source image; alpha is composited onto black
/// * `quality` - Lossy compression quality, `0.0` (smallest) to `1.0` (best)
///
/// # Example
///
/// ```
/// use kitplus_core::decode::DecodedImage;
/// use kitplus_core::encode::encode_jpeg;
///
/// let image = DecodedImage::new(100, 100, vec![128u8; 100 * 100 * 4]);
/// let jpeg = encode_jpeg(&image, 0.9).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &DecodedImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut rgba = image.pixels.clone();
    flatten_alpha(&mut rgba);
    let rgb: Vec<u8> = rgba
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));

    encoder
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode an image to PNG bytes, keeping its alpha channel.
pub fn encode_png(image: &DecodedImage) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Check that the image carries a complete RGBA buffer.
pub(crate) fn validate(image: &DecodedImage) -> Result<(), EncodeError> {
    if image.pixels.is_empty() {
        return Err(EncodeError::NoPixelData);
    }

    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = (image.width as usize) * (image.height as usize) * 4;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn gray(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(width, height, [128u8, 128, 128, 255].repeat((width * height) as usize))
    }

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    ((x ^ y) & 0xFF) as u8,
                    255,
                ]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.9), 90);
        assert_eq!(jpeg_quality(0.0001), 1);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(7.0), 100);
        assert_eq!(jpeg_quality(f32::NAN), 1);
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 0.9).unwrap();

        // Check JPEG magic bytes (SOI marker)
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);

        // Check JPEG ends with EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_affects_size() {
        let img = gradient(128, 128);

        let low_q = encode_jpeg(&img, 0.1).unwrap();
        let high_q = encode_jpeg(&img, 0.95).unwrap();

        assert!(high_q.len() > low_q.len());
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = DecodedImage::new(8, 8, [255u8, 255, 255, 0].repeat(64));
        let decoded = decode(&encode_jpeg(&img, 1.0).unwrap()).unwrap();
        assert!(decoded.is_opaque());
        // Fully transparent white composites to black
        assert!(decoded.pixels[0] < 16);
    }

    #[test]
    fn test_encode_jpeg_no_pixel_data() {
        let img = DecodedImage::without_pixels(10, 10, 1.0);
        assert!(matches!(encode_jpeg(&img, 0.5), Err(EncodeError::NoPixelData)));
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let img = DecodedImage {
            width: 100,
            height: 100,
            scale: 1.0,
            pixels: vec![128u8; 99 * 100 * 4],
        };
        assert!(matches!(
            encode_jpeg(&img, 0.9),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_zero_width() {
        let img = DecodedImage {
            width: 0,
            height: 100,
            scale: 1.0,
            pixels: vec![1],
        };
        assert!(matches!(
            encode_jpeg(&img, 0.9),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_png_keeps_alpha() {
        let img = DecodedImage::new(3, 2, [10u8, 20, 30, 40].repeat(6));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = decode(&png).unwrap();
        assert_eq!(decoded.pixels, img.pixels);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
