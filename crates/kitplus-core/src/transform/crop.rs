//! Image cropping operations.
//!
//! Rectangles are in pixel coordinates with the origin at the top-left corner.
//! Requests extending past the image are clipped to its bounds.

use crate::decode::DecodedImage;

/// Copy a pixel rectangle out of an image.
///
/// Returns `None` if the image has no pixel data or the clipped rectangle
/// is empty.
pub fn crop_pixels(
    image: &DecodedImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Option<DecodedImage> {
    if !image.has_pixel_data() {
        return None;
    }

    let left = x.min(image.width);
    let top = y.min(image.height);
    let right = x.saturating_add(width).min(image.width);
    let bottom = y.saturating_add(height).min(image.height);

    let out_width = right.saturating_sub(left);
    let out_height = bottom.saturating_sub(top);
    if out_width == 0 || out_height == 0 {
        return None;
    }

    let src_stride = image.width as usize * 4;
    let row_len = out_width as usize * 4;
    let mut output = Vec::with_capacity(row_len * out_height as usize);

    // Copy pixel data row by row
    for row in top..bottom {
        let start = row as usize * src_stride + left as usize * 4;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Some(DecodedImage {
        width: out_width,
        height: out_height,
        scale: image.scale,
        pixels: output,
    })
}

/// Crop the centered square whose side is the shorter image edge.
///
/// # Example
///
/// ```
/// use kitplus_core::decode::DecodedImage;
/// use kitplus_core::transform::crop_to_square;
///
/// let image = DecodedImage::new(100, 60, vec![128u8; 100 * 60 * 4]);
/// let square = crop_to_square(&image).unwrap();
/// assert_eq!((square.width, square.height), (60, 60));
/// ```
pub fn crop_to_square(image: &DecodedImage) -> Option<DecodedImage> {
    let side = image.width.min(image.height);
    let x = (image.width - side) / 2;
    let y = (image.height - side) / 2;
    crop_pixels(image, x, y, side, side)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the square side equals the shorter edge.
        #[test]
        fn prop_square_side_is_min_edge(
            (width, height) in (1u32..=64, 1u32..=64),
        ) {
            let img = DecodedImage::new(width, height, vec![7u8; (width * height * 4) as usize]);
            let square = crop_to_square(&img).unwrap();

            prop_assert_eq!(square.width, width.min(height));
            prop_assert_eq!(square.height, width.min(height));
            prop_assert_eq!(square.pixels.len(), (square.width * square.height * 4) as usize);
        }

        /// Property: output never exceeds the input bounds.
        #[test]
        fn prop_crop_bounded_by_input(
            (width, height) in (1u32..=40, 1u32..=40),
            (x, y, w, h) in (0u32..=50, 0u32..=50, 0u32..=50, 0u32..=50),
        ) {
            let img = DecodedImage::new(width, height, vec![1u8; (width * height * 4) as usize]);
            if let Some(out) = crop_pixels(&img, x, y, w, h) {
                prop_assert!(out.width <= width);
                prop_assert!(out.height <= height);
            }
        }
    }
}
