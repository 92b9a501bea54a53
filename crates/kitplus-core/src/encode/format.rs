//! Output formats and the mapping from type identifiers to codecs.

use std::io::Cursor;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::exif::embed_orientation;
use super::jpeg::{encode_jpeg, encode_png, validate, EncodeError};
use crate::decode::{flatten_alpha, DecodedImage, Orientation};

/// Serialization formats offered by the convenience encoders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    /// Lossy JPEG at the given `0.0..=1.0` quality.
    Jpeg(f32),
}

/// Uniform type identifiers for image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    /// Abstract image data.
    Image,
    Jpeg,
    Jpeg2000,
    Tiff,
    /// QuickDraw PICT.
    Pict,
    Gif,
    Png,
    QuickTimeImage,
    AppleIcns,
    Bmp,
    Ico,
    RawImage,
    ScalableVectorGraphics,
    LivePhoto,
}

impl ImageType {
    pub const ALL: [ImageType; 14] = [
        ImageType::Image,
        ImageType::Jpeg,
        ImageType::Jpeg2000,
        ImageType::Tiff,
        ImageType::Pict,
        ImageType::Gif,
        ImageType::Png,
        ImageType::QuickTimeImage,
        ImageType::AppleIcns,
        ImageType::Bmp,
        ImageType::Ico,
        ImageType::RawImage,
        ImageType::ScalableVectorGraphics,
        ImageType::LivePhoto,
    ];

    /// The uniform type identifier string.
    pub fn uti(self) -> &'static str {
        match self {
            ImageType::Image => "public.image",
            ImageType::Jpeg => "public.jpeg",
            ImageType::Jpeg2000 => "public.jpeg-2000",
            ImageType::Tiff => "public.tiff",
            ImageType::Pict => "com.apple.pict",
            ImageType::Gif => "com.compuserve.gif",
            ImageType::Png => "public.png",
            ImageType::QuickTimeImage => "com.apple.quicktime-image",
            ImageType::AppleIcns => "com.apple.icns",
            ImageType::Bmp => "com.microsoft.bmp",
            ImageType::Ico => "com.microsoft.ico",
            ImageType::RawImage => "public.camera-raw-image",
            ImageType::ScalableVectorGraphics => "public.svg-image",
            ImageType::LivePhoto => "com.apple.live-photo",
        }
    }

    /// Look a type up by its identifier.
    pub fn from_uti(uti: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.uti() == uti)
    }

    /// The codec that writes this type, if one is compiled in.
    pub fn codec_format(self) -> Option<image::ImageFormat> {
        match self {
            ImageType::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageType::Tiff => Some(image::ImageFormat::Tiff),
            ImageType::Gif => Some(image::ImageFormat::Gif),
            ImageType::Png => Some(image::ImageFormat::Png),
            ImageType::Bmp => Some(image::ImageFormat::Bmp),
            ImageType::Ico => Some(image::ImageFormat::Ico),
            ImageType::Image
            | ImageType::Jpeg2000
            | ImageType::Pict
            | ImageType::QuickTimeImage
            | ImageType::AppleIcns
            | ImageType::RawImage
            | ImageType::ScalableVectorGraphics
            | ImageType::LivePhoto => None,
        }
    }
}

/// Destination properties for [`encode_as`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Lossy compression quality, `0.0..=1.0`. Ignored by lossless codecs.
    pub quality: f32,
    /// Keep the alpha channel where the codec supports one.
    pub has_alpha: bool,
    /// EXIF orientation tag written into JPEG output.
    pub orientation: Orientation,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 1.0,
            has_alpha: true,
            orientation: Orientation::Normal,
        }
    }
}

/// Encode with one of the convenience formats.
pub fn encode(image: &DecodedImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        ImageFormat::Png => encode_png(image),
        ImageFormat::Jpeg(quality) => encode_jpeg(image, quality),
    }
}

/// Encode as `image_type` with the given destination properties.
///
/// # Errors
///
/// `EncodeError::UnsupportedType` when no codec exists for the type.
pub fn encode_as(
    image: &DecodedImage,
    image_type: ImageType,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;
    let format = image_type
        .codec_format()
        .ok_or(EncodeError::UnsupportedType(image_type))?;

    if format == image::ImageFormat::Jpeg {
        let jpeg = encode_jpeg(image, options.quality)?;
        return embed_orientation(jpeg, options.orientation);
    }

    if options.orientation != Orientation::Normal {
        log::debug!(
            "orientation {:?} is only recorded for JPEG output, not {}",
            options.orientation,
            image_type.uti()
        );
    }

    let rgba = image::RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
        .ok_or(EncodeError::NoPixelData)?;
    let dynamic = if options.has_alpha {
        DynamicImage::ImageRgba8(rgba)
    } else {
        let mut flat = rgba.into_raw();
        flatten_alpha(&mut flat);
        let rgba = image::RgbaImage::from_raw(image.width, image.height, flat)
            .ok_or(EncodeError::NoPixelData)?;
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).into_rgb8())
    };

    let mut buffer = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut buffer, format)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// JPEG data carrying an explicit orientation tag.
pub fn to_jpeg_data(
    image: &DecodedImage,
    quality: f32,
    has_alpha: bool,
    orientation: Orientation,
) -> Result<Vec<u8>, EncodeError> {
    encode_as(
        image,
        ImageType::Jpeg,
        &EncodeOptions {
            quality,
            has_alpha,
            orientation,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode, decode_no_orientation, get_orientation};

    fn sample(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(width, height, [40u8, 80, 120, 200].repeat((width * height) as usize))
    }

    #[test]
    fn test_uti_round_trip() {
        for t in ImageType::ALL {
            assert_eq!(ImageType::from_uti(t.uti()), Some(t));
        }
        assert_eq!(ImageType::from_uti("public.text"), None);
    }

    #[test]
    fn test_encode_as_supported_types() {
        let img = sample(6, 4);
        for t in [ImageType::Png, ImageType::Tiff, ImageType::Gif, ImageType::Bmp, ImageType::Ico] {
            let bytes = encode_as(&img, t, &EncodeOptions::default()).unwrap();
            let decoded = decode(&bytes).unwrap();
            assert_eq!((decoded.width, decoded.height), (6, 4), "{t:?}");
        }
    }

    #[test]
    fn test_encode_as_unsupported_type() {
        let result = encode_as(&sample(2, 2), ImageType::LivePhoto, &EncodeOptions::default());
        assert!(matches!(
            result,
            Err(EncodeError::UnsupportedType(ImageType::LivePhoto))
        ));
    }

    #[test]
    fn test_encode_as_without_alpha() {
        let bytes = encode_as(
            &sample(3, 3),
            ImageType::Png,
            &EncodeOptions {
                has_alpha: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(decode(&bytes).unwrap().is_opaque());
    }

    #[test]
    fn test_to_jpeg_data_records_orientation() {
        let img = sample(8, 4);
        let bytes = to_jpeg_data(&img, 0.8, true, Orientation::Rotate90CW).unwrap();
        assert_eq!(get_orientation(&bytes), Orientation::Rotate90CW);

        let raw = decode_no_orientation(&bytes).unwrap();
        assert_eq!((raw.width, raw.height), (8, 4));
        let oriented = decode(&bytes).unwrap();
        assert_eq!((oriented.width, oriented.height), (4, 8));
    }

    #[test]
    fn test_encode_convenience_formats() {
        let img = sample(5, 5);
        assert_eq!(&encode(&img, ImageFormat::Png).unwrap()[1..4], b"PNG");
        assert_eq!(&encode(&img, ImageFormat::Jpeg(0.5)).unwrap()[..2], &[0xFF, 0xD8]);
    }
}
