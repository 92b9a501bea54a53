//! Kitplus Core - Toolbox for mobile app code
//!
//! This crate provides the platform-independent parts of the kitplus toolbox:
//! size-bounded image compression, image codecs and transforms, calendar
//! arithmetic, font lookup, text field accessories, key window lookup and
//! foreground/background dispatch.

pub mod compress;
pub mod date;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod font;
pub mod input;
pub mod transform;
pub mod window;

pub use compress::{compress_to, resize_to_fit_budget, CompressError, CompressedImage, SizeSource};
pub use date::{Calendar, DateError, DateFormat};
pub use decode::{decode, DecodeError, DecodedImage, Size};
pub use dispatch::{background, DispatchError, MainHandle, MainQueue};
pub use encode::{from_base64, to_base64, EncodeError, ImageFormat, ImageType};
pub use transform::{crop_to_square, rotate_by_degrees, tinted, Color};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn checkerboard(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / 4 + y / 4) % 2 == 0 { 230 } else { 20 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_base64_png_round_trip_keeps_dimensions() {
        let img = checkerboard(37, 21);
        let text = to_base64(&img, ImageFormat::Png).unwrap();
        let back = from_base64(&text).unwrap();
        assert_eq!((back.width, back.height), (37, 21));
        assert_eq!(back.pixels, img.pixels);
    }

    #[test]
    fn test_compress_then_transform() {
        let img = checkerboard(120, 80).with_scale(2.0);
        let compressed = compress_to(&img, 1.0, 0.5, 2.0).unwrap();

        // 60x40 points at half quality, drawn at 2 px/pt
        assert_eq!((compressed.image.width, compressed.image.height), (60, 40));

        let square = crop_to_square(&compressed.image).unwrap();
        let rotated = rotate_by_degrees(&square, 90.0, false);
        assert_eq!((rotated.width, rotated.height), (40, 40));
    }

    #[test]
    fn test_fit_budget_through_main_queue() {
        let queue = MainQueue::new();
        let result = std::sync::Arc::new(std::sync::Mutex::new(None));

        let sink = std::sync::Arc::clone(&result);
        resize_to_fit_budget(
            DecodedImage::without_pixels(0, 0, 1.0),
            1.0,
            SizeSource::InMemory,
            &queue.handle(),
            move |image| *sink.lock().unwrap() = Some(image),
        );

        assert!(queue.run_until(Duration::from_secs(10), || result.lock().unwrap().is_some()));
        assert_eq!(
            result.lock().unwrap().as_ref().map(|i| (i.width, i.height)),
            Some((0, 0))
        );
    }
}
