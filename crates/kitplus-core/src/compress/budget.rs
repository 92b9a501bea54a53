//! Re-encoding an image until it fits a byte budget.
//!
//! Every attempt re-rasterizes the source at `quality`× its logical size
//! (opaque, at the requested pixel density) and JPEG-encodes it at the same
//! quality. An attempt is accepted once its byte count is below the target or
//! the quality has fallen under [`QUALITY_FLOOR`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode, rasterize, DecodeError, DecodedImage, FilterType};
use crate::encode::encode_jpeg;

/// Below this quality any candidate is accepted regardless of size.
pub const QUALITY_FLOOR: f32 = 0.001;

/// Quality used for the floor candidate.
pub const FLOOR_PROBE_QUALITY: f32 = 0.0001;

/// Bisection stops once the quality window is narrower than this.
const QUALITY_TOLERANCE: f32 = 0.01;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Errors from [`compress_to`] and [`compress_with`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The source has no bitmap, so no attempt can ever be encoded.
    #[error("Source image has no pixel data")]
    NoPixelData,

    #[error("Invalid compression request: {0}")]
    InvalidRequest(String),

    /// The iteration cap was reached without an encodable candidate.
    #[error("No candidate could be encoded in {iterations} attempts")]
    Exhausted { iterations: u32 },

    /// The accepted bytes could not be decoded again.
    #[error("Failed to decode compressed output: {0}")]
    Decode(#[from] DecodeError),
}

/// How quality is lowered after a candidate misses the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompressionSchedule {
    /// Jump from the initial quality straight to the floor quality.
    TwoStep,
    /// Probe the floor, then bisect towards the highest quality that fits.
    #[default]
    BinarySearch,
}

/// Tuning for the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub schedule: CompressionSchedule,
    /// Upper bound on encode attempts, failed ones included. At least two
    /// attempts are always allowed so the floor candidate can be reached.
    pub max_iterations: u32,
    pub filter: FilterType,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            schedule: CompressionSchedule::BinarySearch,
            max_iterations: 12,
            filter: FilterType::Bilinear,
        }
    }
}

/// Parameters of one compression call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionRequest {
    pub target_size_bytes: usize,
    pub initial_quality: f32,
    pub scale: f64,
}

impl CompressionRequest {
    /// Build a request from a budget in mebibytes.
    pub fn new(target_mb: f64, initial_quality: f32, scale: f64) -> Result<Self, CompressError> {
        let target_size_bytes = (target_mb * BYTES_PER_MB) as usize;
        if target_size_bytes == 0 {
            return Err(CompressError::InvalidRequest(format!(
                "target size {target_mb} MB is below one byte"
            )));
        }
        if !(initial_quality > 0.0 && initial_quality <= 1.0) {
            return Err(CompressError::InvalidRequest(format!(
                "quality {initial_quality} is outside (0, 1]"
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CompressError::InvalidRequest(format!(
                "scale {scale} must be positive"
            )));
        }
        Ok(Self {
            target_size_bytes,
            initial_quality,
            scale,
        })
    }
}

/// The accepted candidate.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// `encoded` decoded back into a bitmap at the request's scale.
    pub image: DecodedImage,
    /// JPEG bytes of the accepted candidate.
    pub encoded: Vec<u8>,
    /// Quality the candidate was produced with.
    pub quality: f32,
}

/// Compress `image` below `target_mb` mebibytes with the default configuration.
///
/// # Example
///
/// ```ignore
/// let result = compress_to(&photo, 2.0, 0.9, 1.0)?;
/// assert!(result.encoded.len() < 2 * 1024 * 1024 || result.quality < QUALITY_FLOOR);
/// ```
pub fn compress_to(
    image: &DecodedImage,
    target_mb: f64,
    quality: f32,
    scale: f64,
) -> Result<CompressedImage, CompressError> {
    let request = CompressionRequest::new(target_mb, quality, scale)?;
    compress_with(image, &request, &CompressionConfig::default())
}

/// Compress `image` according to `request` and `config`.
pub fn compress_with(
    image: &DecodedImage,
    request: &CompressionRequest,
    config: &CompressionConfig,
) -> Result<CompressedImage, CompressError> {
    if !image.has_pixel_data() {
        return Err(CompressError::NoPixelData);
    }

    let mut attempts = Attempts {
        image,
        request,
        filter: config.filter,
        limit: config.max_iterations.max(2),
        used: 0,
    };

    let (encoded, quality) = match config.schedule {
        CompressionSchedule::TwoStep => two_step(&mut attempts)?,
        CompressionSchedule::BinarySearch => binary_search(&mut attempts)?,
    };

    log::info!(
        "compressed to {} bytes at quality {quality} after {} attempts",
        encoded.len(),
        attempts.used
    );

    let image = decode(&encoded)?.with_scale(request.scale);
    Ok(CompressedImage {
        image,
        encoded,
        quality,
    })
}

fn two_step(attempts: &mut Attempts<'_>) -> Result<(Vec<u8>, f32), CompressError> {
    let mut comp = attempts.request.initial_quality;
    loop {
        let bytes = attempts.encode(comp)?;
        if attempts.fits(&bytes) || comp < QUALITY_FLOOR {
            return Ok((bytes, comp));
        }
        comp = FLOOR_PROBE_QUALITY;
    }
}

fn binary_search(attempts: &mut Attempts<'_>) -> Result<(Vec<u8>, f32), CompressError> {
    let initial = attempts.request.initial_quality;
    let first = attempts.encode(initial)?;
    if attempts.fits(&first) || initial < QUALITY_FLOOR {
        return Ok((first, initial));
    }

    let floor = attempts.encode(FLOOR_PROBE_QUALITY)?;
    if !attempts.fits(&floor) {
        return Ok((floor, FLOOR_PROBE_QUALITY));
    }

    let mut best = (floor, FLOOR_PROBE_QUALITY);
    let (mut lo, mut hi) = (FLOOR_PROBE_QUALITY, initial);
    while hi - lo > QUALITY_TOLERANCE && attempts.remaining() > 0 {
        let mid = (lo + hi) / 2.0;
        match attempts.encode(mid) {
            Ok(bytes) if attempts.fits(&bytes) => {
                best = (bytes, mid);
                lo = mid;
            }
            Ok(_) => hi = mid,
            Err(CompressError::Exhausted { .. }) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(best)
}

/// Bounded supply of encode attempts for one call.
struct Attempts<'a> {
    image: &'a DecodedImage,
    request: &'a CompressionRequest,
    filter: FilterType,
    limit: u32,
    used: u32,
}

impl Attempts<'_> {
    fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    fn fits(&self, bytes: &[u8]) -> bool {
        bytes.len() < self.request.target_size_bytes
    }

    /// Encode a candidate at `quality`, retrying failures while attempts remain.
    fn encode(&mut self, quality: f32) -> Result<Vec<u8>, CompressError> {
        while self.used < self.limit {
            self.used += 1;
            match self.candidate(quality) {
                Ok(bytes) => {
                    log::debug!(
                        "attempt {}: quality {quality} -> {} bytes (target {})",
                        self.used,
                        bytes.len(),
                        self.request.target_size_bytes
                    );
                    return Ok(bytes);
                }
                Err(reason) => {
                    log::debug!("attempt {}: quality {quality} failed: {reason}", self.used);
                }
            }
        }
        Err(CompressError::Exhausted { iterations: self.used })
    }

    fn candidate(&self, quality: f32) -> Result<Vec<u8>, String> {
        let size = self.image.size().scaled(quality as f64);
        let resized = rasterize(self.image, size, self.request.scale, true, self.filter)
            .map_err(|e| e.to_string())?;
        encode_jpeg(&resized, quality).map_err(|e| e.to_string())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
