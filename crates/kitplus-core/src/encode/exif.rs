//! Orientation metadata for JPEG output.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};

use super::jpeg::EncodeError;
use crate::decode::Orientation;

/// Replace the EXIF segment of `jpeg` with one holding only `orientation`.
///
/// # Errors
///
/// `EncodeError::EncodingFailed` when `jpeg` is not a parseable JPEG stream
/// or the EXIF payload cannot be built.
pub(crate) fn embed_orientation(jpeg: Vec<u8>, orientation: Orientation) -> Result<Vec<u8>, EncodeError> {
    let mut parts = Jpeg::from_bytes(Bytes::from(jpeg))
        .map_err(|e| EncodeError::EncodingFailed(format!("JPEG structure: {e}")))?;
    parts.set_exif(Some(orientation_exif(orientation)?));
    Ok(parts.encoder().bytes().to_vec())
}

/// Big-endian TIFF payload with the orientation in the primary IFD.
fn orientation_exif(orientation: Orientation) -> Result<Bytes, EncodeError> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation.exif_value()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, false)
        .map_err(|e| EncodeError::EncodingFailed(format!("EXIF: {e}")))?;
    Ok(Bytes::from(buf.into_inner()))
}
