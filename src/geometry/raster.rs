//! Axis-agnostic crop and paste over RGB rasters
//!
//! Every geometric case is written once in terms of "along" and "across" the
//! growth axis; these helpers translate spans back into pixel rectangles.

use std::ops::Range;

use image::{RgbImage, imageops};

use crate::geometry::mode::Axis;

/// Mutable RGB raster grown by committed steps
pub type Canvas = RgbImage;
/// Conditioning strip cut from the canvas frontier
pub type Band = RgbImage;
/// Square raster produced by the generator
pub type Tile = RgbImage;

/// Copy the span `range` along `axis`, keeping the full extent across it
pub fn span(image: &RgbImage, axis: Axis, range: Range<u32>) -> RgbImage {
    let (width, height) = image.dimensions();
    let len = range.end.saturating_sub(range.start);
    match axis {
        Axis::Horizontal => imageops::crop_imm(image, range.start, 0, len, height).to_image(),
        Axis::Vertical => imageops::crop_imm(image, 0, range.start, width, len).to_image(),
    }
}

/// Paste `source` into `target` at `offset` along `axis`
pub fn paste_span(target: &mut RgbImage, source: &RgbImage, axis: Axis, offset: u32) {
    let offset = i64::from(offset);
    match axis {
        Axis::Horizontal => imageops::replace(target, source, offset, 0),
        Axis::Vertical => imageops::replace(target, source, 0, offset),
    }
}

/// Mirror an image along `axis` so index 0 and the last index swap
pub fn flip_along(image: &RgbImage, axis: Axis) -> RgbImage {
    match axis {
        Axis::Horizontal => imageops::flip_horizontal(image),
        Axis::Vertical => imageops::flip_vertical(image),
    }
}

/// Black raster with the given lengths along and across `axis`
pub fn blank(axis: Axis, along: u32, across: u32) -> RgbImage {
    let (width, height) = axis.size(along, across);
    RgbImage::new(width, height)
}

/// Length of `image` along `axis`
pub fn along(image: &RgbImage, axis: Axis) -> u32 {
    axis.along(image.dimensions())
}

/// Length of `image` across `axis`
pub fn across(image: &RgbImage, axis: Axis) -> u32 {
    axis.across(image.dimensions())
}
