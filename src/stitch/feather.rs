//! Feathered gluing confined to the overlap strip

use crate::geometry::band::check_canvas;
use crate::geometry::glue::glue;
use crate::geometry::mode::{Axis, Direction};
use crate::geometry::raster::{self, Canvas, Tile};
use crate::geometry::tile::{check_tile, overlap_range};
use crate::geometry::{GrowthContract, GrowthMode};
use crate::io::error::{Result, dimension_error};
use crate::math::ramp::{alpha_ramp, blend_channel};

/// Glue `tile` onto `canvas`, cross-fading the overlap strip over
/// `feather_px` pixels
///
/// A `feather_px` of zero is the hard replace of [`glue`]. Otherwise the width
/// is clamped to `[1, overlap]` and the ramp runs from alpha 0 at the strip's
/// far edge to 255 at the seam, pure canvas before the ramp starts. Only the
/// tile's overlap strip is rewritten, so the keep region and the new half are
/// untouched.
///
/// # Errors
///
/// Returns a dimension error under the same conditions as [`glue`]
pub fn glue_with_feather(
    canvas: &Canvas,
    tile: &Tile,
    mode: GrowthMode,
    contract: &GrowthContract,
    feather_px: u32,
) -> Result<Canvas> {
    if feather_px == 0 || contract.overlap == 0 {
        return glue(canvas, tile, mode, contract);
    }
    check_canvas(canvas, mode, contract)?;
    check_tile(tile, contract)?;

    let axis = mode.axis();
    let overlap = contract.overlap;
    let len = raster::along(canvas, axis);
    if len < overlap {
        return Err(dimension_error(
            "canvas growth axis",
            axis.size(overlap, contract.tile_size),
            canvas.dimensions(),
        ));
    }
    let feather = feather_px.clamp(1, overlap);

    let tile_strip_range = overlap_range(mode, contract);
    let canvas_strip_range = match mode.direction() {
        Direction::Forward => (len - overlap)..len,
        Direction::Reverse => 0..overlap,
    };
    let canvas_strip = raster::span(canvas, axis, canvas_strip_range);
    let mut blended = raster::span(tile, axis, tile_strip_range.clone());

    let profile = feather_profile(mode, overlap, feather);
    for (x, y, pixel) in blended.enumerate_pixels_mut() {
        let depth = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        let alpha = profile.get(depth as usize).copied().unwrap_or(255);
        let under = canvas_strip.get_pixel(x, y).0;
        pixel.0 = [
            blend_channel(under[0], pixel.0[0], alpha),
            blend_channel(under[1], pixel.0[1], alpha),
            blend_channel(under[2], pixel.0[2], alpha),
        ];
    }

    let mut feathered = tile.clone();
    raster::paste_span(&mut feathered, &blended, axis, tile_strip_range.start);

    tracing::debug!(%mode, feather, overlap, "Feathered overlap strip");
    glue(canvas, &feathered, mode, contract)
}

/// Alpha at each strip position, ordered along the growth axis
fn feather_profile(mode: GrowthMode, overlap: u32, feather: u32) -> Vec<u8> {
    let flat = (overlap - feather) as usize;
    let ramp = if feather == 1 {
        vec![255]
    } else {
        alpha_ramp(0, 255, feather as usize)
    };
    match mode.direction() {
        // Seam at the end of the strip
        Direction::Forward => std::iter::repeat_n(0, flat).chain(ramp).collect(),
        // Seam at the start of the strip
        Direction::Reverse => ramp.into_iter().rev().chain(std::iter::repeat_n(0, flat)).collect(),
    }
}
