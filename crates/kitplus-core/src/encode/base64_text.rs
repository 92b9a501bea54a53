//! Base64 transport of encoded images.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::{encode, EncodeError, ImageFormat};
use crate::decode::{decode, DecodeError, DecodedImage};

/// Standard alphabet that accepts input with or without padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode the image in `format` and return the bytes as base64 text.
pub fn to_base64(image: &DecodedImage, format: ImageFormat) -> Result<String, EncodeError> {
    let bytes = encode(image, format)?;
    Ok(LENIENT.encode(bytes))
}

/// Decode base64 text into an image.
///
/// A `data:` URL header up to the first comma is skipped. Characters outside
/// the base64 alphabet, such as line breaks and spaces, are ignored.
pub fn from_base64(text: &str) -> Result<DecodedImage, DecodeError> {
    let text = text.trim_start();
    let payload = match text.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((_, payload)) => payload,
        None => text,
    };
    let cleaned: String = payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    if cleaned.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let bytes = LENIENT
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    decode(&bytes)
}
