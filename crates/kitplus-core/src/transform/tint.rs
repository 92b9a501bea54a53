//! Template-style recoloring.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Treat the image as a template: every pixel takes `color`, keeping the
/// source's alpha as a mask (multiplied by the color's own alpha).
pub fn tinted(image: &DecodedImage, color: Color) -> DecodedImage {
    let mut output = image.clone();
    for px in output.pixels.chunks_exact_mut(4) {
        let alpha = (px[3] as u32 * color.a as u32 + 127) / 255;
        px[0] = color.r;
        px[1] = color.g;
        px[2] = color.b;
        px[3] = alpha as u8;
    }
    output
}
