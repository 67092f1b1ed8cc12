//! Conditioning band extraction from the canvas frontier

use crate::geometry::contract::GrowthContract;
use crate::geometry::mode::{Direction, GrowthMode};
use crate::geometry::raster::{self, Band, Canvas};
use crate::io::error::{Result, dimension_error};

/// Shape (width, height) every band of `mode` must have
pub const fn expected_band_size(mode: GrowthMode, contract: &GrowthContract) -> (u32, u32) {
    mode.axis().size(contract.band_size, contract.tile_size)
}

/// Check the cross-axis invariant of a canvas
///
/// # Errors
///
/// Returns a dimension error if the canvas extent across the growth axis is
/// not exactly the tile size
pub fn check_canvas(canvas: &Canvas, mode: GrowthMode, contract: &GrowthContract) -> Result<()> {
    let axis = mode.axis();
    let across = raster::across(canvas, axis);
    if across != contract.tile_size {
        let along = raster::along(canvas, axis);
        return Err(dimension_error(
            "canvas cross axis",
            axis.size(along, contract.tile_size),
            canvas.dimensions(),
        ));
    }
    Ok(())
}

/// Crop the extremal band at the frontier implied by `mode`
///
/// Grow-right takes the rightmost columns, grow-left the leftmost, grow-down
/// the bottom rows and grow-up the top rows.
///
/// # Errors
///
/// Returns a dimension error if:
/// - The canvas cross axis is not the tile size
/// - The canvas growth axis is shorter than the band
pub fn extract_band(canvas: &Canvas, mode: GrowthMode, contract: &GrowthContract) -> Result<Band> {
    check_canvas(canvas, mode, contract)?;

    let axis = mode.axis();
    let along = raster::along(canvas, axis);
    if along < contract.band_size {
        return Err(dimension_error(
            "canvas growth axis",
            expected_band_size(mode, contract),
            canvas.dimensions(),
        ));
    }

    let start = match mode.direction() {
        Direction::Forward => along - contract.band_size,
        Direction::Reverse => 0,
    };
    let band = raster::span(canvas, axis, start..start + contract.band_size);

    tracing::debug!(%mode, start, size = ?band.dimensions(), "Extracted conditioning band");
    Ok(band)
}

/// Check that a band has the shape implied by `mode`
///
/// # Errors
///
/// Returns a dimension error on any shape mismatch
pub fn check_band(band: &Band, mode: GrowthMode, contract: &GrowthContract) -> Result<()> {
    let expected = expected_band_size(mode, contract);
    if band.dimensions() != expected {
        return Err(dimension_error("band", expected, band.dimensions()));
    }
    Ok(())
}
