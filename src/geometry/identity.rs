//! Keep-region identity between a tile's conditioning half and the band
//!
//! Only the far `keep` pixels of the conditioning half are guaranteed to equal
//! the band. The overlap strip next to the seam belongs to the generator.

use std::ops::Range;

use crate::geometry::band::check_band;
use crate::geometry::contract::GrowthContract;
use crate::geometry::mode::{Direction, GrowthMode};
use crate::geometry::raster::{self, Band, Tile};
use crate::geometry::tile::check_tile;
use crate::io::error::{GrowError, Result};

/// Span of the keep region in tile coordinates along the growth axis
pub const fn keep_range_in_tile(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    match mode.direction() {
        Direction::Forward => 0..contract.keep(),
        Direction::Reverse => (contract.tile_size - contract.keep())..contract.tile_size,
    }
}

/// Span of the keep region in band coordinates along the growth axis
pub const fn keep_range_in_band(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    match mode.direction() {
        Direction::Forward => 0..contract.keep(),
        Direction::Reverse => (contract.band_size - contract.keep())..contract.band_size,
    }
}

/// Overwrite the keep region of `tile` with the matching band pixels
///
/// # Errors
///
/// Returns a dimension error if the tile or band has the wrong shape
pub fn post_enforce_keep(
    tile: &mut Tile,
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<()> {
    check_tile(tile, contract)?;
    check_band(band, mode, contract)?;
    let axis = mode.axis();
    let keep = raster::span(band, axis, keep_range_in_band(mode, contract));
    raster::paste_span(tile, &keep, axis, keep_range_in_tile(mode, contract).start);
    Ok(())
}

/// Count keep-region pixels of `tile` that differ from `band`
///
/// # Errors
///
/// Returns a dimension error if the tile or band has the wrong shape
pub fn keep_mismatches(
    tile: &Tile,
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<(usize, usize)> {
    check_tile(tile, contract)?;
    check_band(band, mode, contract)?;
    let axis = mode.axis();
    let from_tile = raster::span(tile, axis, keep_range_in_tile(mode, contract));
    let from_band = raster::span(band, axis, keep_range_in_band(mode, contract));

    let mismatched = from_tile
        .pixels()
        .zip(from_band.pixels())
        .filter(|(a, b)| a != b)
        .count();
    let compared = (from_tile.width() as usize) * (from_tile.height() as usize);
    Ok((mismatched, compared))
}

/// Require the keep region of `tile` to be pixel-identical to `band`
///
/// # Errors
///
/// Returns a dimension error on shape mismatch, or a band identity violation
/// if any keep-region pixel differs
pub fn check_band_identity(
    tile: &Tile,
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<()> {
    let (mismatched_pixels, compared_pixels) = keep_mismatches(tile, band, mode, contract)?;
    if mismatched_pixels > 0 {
        return Err(GrowError::BandIdentity {
            mismatched_pixels,
            compared_pixels,
        });
    }
    Ok(())
}
