//! Resizing and re-rasterization.
//!
//! Sizes passed to these functions are logical points; the output pixel
//! dimensions are `floor(points * scale)`, never less than one pixel.
//! All functions return new `DecodedImage` instances without modifying the input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DecodedImage, FilterType, Size};

/// Guards `floor` against values like 28.999999999999996.
const PIXEL_EPSILON: f64 = 1e-9;

/// Errors from resize operations.
#[derive(Debug, Error, PartialEq)]
pub enum ResizeError {
    /// Requested output dimensions are zero, negative or not finite.
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    /// The source has no pixel buffer to draw from.
    #[error("Source image has no pixel data")]
    NoPixelData,

    /// Only aspect-fit resizing is implemented for fixed-dimension resizes.
    #[error("Unsupported content mode: {0:?}")]
    UnsupportedContentMode(ContentMode),
}

/// How content is laid out when drawn into a target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentMode {
    ScaleToFill,
    #[default]
    ScaleAspectFit,
    ScaleAspectFill,
    Redraw,
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Resize an image to exact pixel dimensions. The scale is preserved.
///
/// # Errors
///
/// Returns `ResizeError::InvalidDimensions` for a zero target and
/// `ResizeError::NoPixelData` if the source has no bitmap.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidDimensions {
            width: width as f64,
            height: height as f64,
        });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height && image.has_pixel_data() {
        return Ok(image.clone());
    }

    let rgba = image.to_rgba_image().ok_or(ResizeError::NoPixelData)?;
    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized, image.scale))
}

/// Draw `image` into a new bitmap of logical `size` at pixel density `scale`.
///
/// When `opaque` is set the result has no alpha: transparent areas become black.
pub fn rasterize(
    image: &DecodedImage,
    size: Size,
    scale: f64,
    opaque: bool,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    let (width, height) = pixel_dimensions(size, scale)?;
    let mut output = resize(image, width, height, filter)?.with_scale(scale);
    if opaque {
        flatten_alpha(&mut output.pixels);
    }
    Ok(output)
}

/// Shrink or grow an image by a percentage of its logical size,
/// keeping its scale.
pub fn resize_with_percentage(
    image: &DecodedImage,
    percentage: f64,
) -> Result<DecodedImage, ResizeError> {
    rasterize(
        image,
        image.size().scaled(percentage),
        image.scale,
        false,
        FilterType::Bilinear,
    )
}

/// Scale an image by `factor`, preserving aspect ratio.
pub fn scale_by_factor(image: &DecodedImage, factor: f64) -> Result<DecodedImage, ResizeError> {
    rasterize(
        image,
        image.size().scaled(factor),
        image.scale,
        false,
        FilterType::Lanczos3,
    )
}

/// Scale an image to fit inside `target` (points), preserving aspect ratio.
pub fn scale_preserving_aspect_ratio(
    image: &DecodedImage,
    target: Size,
) -> Result<DecodedImage, ResizeError> {
    let size = image.size();
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(ResizeError::NoPixelData);
    }
    let factor = (target.width / size.width).min(target.height / size.height);
    scale_by_factor(image, factor)
}

/// Resize so the longer edge equals `dimension` points.
///
/// Only `ContentMode::ScaleAspectFit` is supported.
pub fn resize_to_dimension(
    image: &DecodedImage,
    dimension: f64,
    opaque: bool,
    content_mode: ContentMode,
    scale: f64,
) -> Result<DecodedImage, ResizeError> {
    let size = image.size();
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(ResizeError::NoPixelData);
    }
    let aspect_ratio = size.width / size.height;

    let target = match content_mode {
        ContentMode::ScaleAspectFit if aspect_ratio > 1.0 => {
            Size::new(dimension, dimension / aspect_ratio)
        }
        ContentMode::ScaleAspectFit => Size::new(dimension * aspect_ratio, dimension),
        other => return Err(ResizeError::UnsupportedContentMode(other)),
    };

    rasterize(image, target, scale, opaque, FilterType::Lanczos3)
}

/// Composite RGBA pixels onto black and mark them opaque.
pub(crate) fn flatten_alpha(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        if alpha == 255 {
            continue;
        }
        for channel in &mut px[..3] {
            *channel = ((*channel as u32 * alpha + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

fn pixel_dimensions(size: Size, scale: f64) -> Result<(u32, u32), ResizeError> {
    let width = size.width * scale;
    let height = size.height * scale;
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(ResizeError::InvalidDimensions { width, height });
    }
    let to_px = |v: f64| ((v + PIXEL_EPSILON).floor() as u32).max(1);
    Ok((to_px(width), to_px(height)))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
