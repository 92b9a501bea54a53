//! Shrinking an image until its footprint fits a memory budget.
//!
//! The work runs on the background pool and the completion is delivered on
//! the foreground queue exactly once, with the original image whenever
//! shrinking is unnecessary or fails.

use std::fs;
use std::path::PathBuf;

use crate::decode::{decode, resize_with_percentage, DecodedImage};
use crate::dispatch::{background, MainHandle};
use crate::encode::{encode_jpeg, encode_png};

use super::budget::BYTES_PER_MB;

/// Subtracted from the budget ratio before shrinking.
const SHRINK_MARGIN: f64 = 0.1;

/// Where the size of the original image is measured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SizeSource {
    /// Bitmap footprint: `height * bytes_per_row`.
    #[default]
    InMemory,
    /// Byte length of the file the image was loaded from.
    File(PathBuf),
}

/// Size of `image` in mebibytes as measured by `source`.
pub fn original_size_mb(image: &DecodedImage, source: &SizeSource) -> std::io::Result<f64> {
    let bytes = match source {
        SizeSource::InMemory => image.estimated_memory_bytes() as u64,
        SizeSource::File(path) => fs::metadata(path)?.len(),
    };
    Ok(bytes as f64 / BYTES_PER_MB)
}

/// Synchronous core of [`resize_to_fit_budget`].
///
/// Returns `image` unchanged when it already fits, when the size cannot be
/// measured, or when any shrinking step fails.
pub fn fit_to_budget(image: DecodedImage, max_size_mb: f64, source: &SizeSource) -> DecodedImage {
    let original_mb = match original_size_mb(&image, source) {
        Ok(mb) => mb,
        Err(e) => {
            log::warn!("could not measure image size from {source:?}: {e}");
            return image;
        }
    };

    if original_mb <= max_size_mb {
        log::debug!("image is {original_mb:.3} MB, within {max_size_mb} MB budget");
        return image;
    }

    let percentage = max_size_mb / original_mb - SHRINK_MARGIN;
    match shrink(&image, percentage) {
        Some(shrunk) => {
            log::info!(
                "shrunk {}x{} to {}x{} ({percentage:.3} of {original_mb:.3} MB)",
                image.width,
                image.height,
                shrunk.width,
                shrunk.height
            );
            shrunk
        }
        None => image,
    }
}

fn shrink(image: &DecodedImage, percentage: f64) -> Option<DecodedImage> {
    let resized = match resize_with_percentage(image, percentage) {
        Ok(resized) => resized,
        Err(e) => {
            log::warn!("resize by {percentage:.3} failed: {e}");
            return None;
        }
    };

    let encoded = encode_png(&resized).or_else(|e| {
        log::debug!("PNG encode failed, falling back to JPEG: {e}");
        encode_jpeg(&resized, 1.0)
    });
    let bytes = match encoded {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("could not encode shrunk image: {e}");
            return None;
        }
    };

    match decode(&bytes) {
        Ok(decoded) => Some(decoded.with_scale(image.scale)),
        Err(e) => {
            log::warn!("could not decode shrunk image: {e}");
            None
        }
    }
}

/// Shrink `image` to fit `max_size_mb` on the background pool and hand the
/// result to `completion` on the foreground queue behind `main`.
///
/// `completion` runs exactly once. If the foreground queue is already closed
/// it never runs and a warning is logged.
pub fn resize_to_fit_budget<F>(
    image: DecodedImage,
    max_size_mb: f64,
    source: SizeSource,
    main: &MainHandle,
    completion: F,
) where
    F: FnOnce(DecodedImage) + Send + 'static,
{
    let main = main.clone();
    background(move || {
        let output = fit_to_budget(image, max_size_mb, &source);
        if main.dispatch(move || completion(output)).is_err() {
            log::warn!("main queue closed before resize completion could be delivered");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MainQueue;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 90, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_in_memory_size_uses_padded_rows() {
        // 5 px * 4 bytes = 20, padded to 32 per row
        let img = gradient(5, 4);
        let mb = original_size_mb(&img, &SizeSource::InMemory).unwrap();
        assert_eq!(mb, 128.0 / BYTES_PER_MB);
    }

    #[test]
    fn test_file_size_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 2048]).unwrap();
        let source = SizeSource::File(file.path().to_path_buf());

        let mb = original_size_mb(&gradient(1, 1), &source).unwrap();
        assert_eq!(mb, 2048.0 / BYTES_PER_MB);
    }

    #[test]
    fn test_fitting_image_is_returned_unchanged() {
        let img = gradient(32, 32);
        let out = fit_to_budget(img.clone(), 1.0, &SizeSource::InMemory);
        assert_eq!(out, img);
    }

    #[test]
    fn test_oversized_image_is_shrunk() {
        // 512 * 512 * 4 = 1 MB in memory
        let img = gradient(512, 512).with_scale(2.0);
        let out = fit_to_budget(img, 0.5, &SizeSource::InMemory);

        // percentage = 0.5 / 1.0 - 0.1 = 0.4
        assert_eq!((out.width, out.height), (204, 204));
        assert_eq!(out.scale, 2.0);
        assert!(original_size_mb(&out, &SizeSource::InMemory).unwrap() < 0.5);
    }

    #[test]
    fn test_zero_budget_falls_back_to_original() {
        // Negative percentage cannot be rasterized
        let img = gradient(16, 16);
        let out = fit_to_budget(img.clone(), 0.0, &SizeSource::InMemory);
        assert_eq!(out, img);
    }

    #[test]
    fn test_missing_file_falls_back_to_original() {
        let img = gradient(8, 8);
        let source = SizeSource::File(PathBuf::from("/nonexistent/kitplus/photo.jpg"));
        assert_eq!(fit_to_budget(img.clone(), 0.0, &source), img);
    }

    #[test]
    fn test_no_pixel_data_falls_back_to_original() {
        let img = DecodedImage::without_pixels(2048, 2048, 1.0);
        let out = fit_to_budget(img.clone(), 1.0, &SizeSource::InMemory);
        assert_eq!(out, img);
    }

    #[test]
    fn test_completion_runs_once_on_main_thread() {
        let queue = MainQueue::new();
        let main_id = thread::current().id();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let calls_clone = Arc::clone(&calls);
        resize_to_fit_budget(
            gradient(512, 512),
            0.5,
            SizeSource::InMemory,
            &queue.handle(),
            move |image| {
                calls_clone
                    .lock()
                    .unwrap()
                    .push((thread::current().id(), image.width));
            },
        );

        assert!(queue.run_until(Duration::from_secs(30), || !calls.lock().unwrap().is_empty()));
        // Nothing else arrives afterwards
        assert!(!queue.run_next(Duration::from_millis(100)));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (main_id, 204));
    }

    #[test]
    fn test_completion_delivers_original_on_failure() {
        let queue = MainQueue::new();
        let delivered = Arc::new(Mutex::new(None));

        let delivered_clone = Arc::clone(&delivered);
        resize_to_fit_budget(
            gradient(16, 16),
            0.0,
            SizeSource::InMemory,
            &queue.handle(),
            move |image| *delivered_clone.lock().unwrap() = Some(image),
        );

        assert!(queue.run_until(Duration::from_secs(10), || delivered.lock().unwrap().is_some()));
        assert_eq!(delivered.lock().unwrap().as_ref(), Some(&gradient(16, 16)));
    }
}
