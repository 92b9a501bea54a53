//! Geometric and color transforms: rotation, cropping and tinting.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Crop rectangles are in pixels
//! - Origin is top-left corner
//!
//! Every transform keeps the source image's scale.

mod crop;
mod rotation;
mod tint;

pub use crop::{crop_pixels, crop_to_square};
pub use rotation::{compute_rotated_bounds, rotate_by_degrees};
pub use tint::{tinted, Color};
