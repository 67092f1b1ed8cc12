//! Tile halves and the patch window pasted onto the canvas
//!
//! Tile coordinates along the growth axis, with `H = tile_size / 2`:
//!
//! | direction | conditioning | new       | patch window                 |
//! |-----------|--------------|-----------|------------------------------|
//! | forward   | `[0, H)`     | `[H, 2H)` | `[H - overlap, H + advance)` |
//! | reverse   | `[H, 2H)`    | `[0, H)`  | `[H - advance, H + overlap)` |

use std::ops::Range;

use crate::geometry::contract::GrowthContract;
use crate::geometry::mode::{Direction, GrowthMode};
use crate::geometry::raster::{self, Tile};
use crate::io::error::{Result, dimension_error};

/// Check that a tile is exactly `tile_size` square
///
/// # Errors
///
/// Returns a dimension error on any other shape
pub fn check_tile(tile: &Tile, contract: &GrowthContract) -> Result<()> {
    let expected = (contract.tile_size, contract.tile_size);
    if tile.dimensions() != expected {
        return Err(dimension_error("tile", expected, tile.dimensions()));
    }
    Ok(())
}

/// Span of the conditioning half along the growth axis
pub const fn conditioning_range(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    let half = contract.half();
    match mode.direction() {
        Direction::Forward => 0..half,
        Direction::Reverse => half..contract.tile_size,
    }
}

/// Span of the freshly generated half along the growth axis
pub const fn new_range(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    let half = contract.half();
    match mode.direction() {
        Direction::Forward => half..contract.tile_size,
        Direction::Reverse => 0..half,
    }
}

/// Span of the tile pasted onto the canvas
pub const fn patch_range(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    let half = contract.half();
    match mode.direction() {
        Direction::Forward => (half - contract.overlap)..(half + contract.advance),
        Direction::Reverse => (half - contract.advance)..(half + contract.overlap),
    }
}

/// Span of the overlap strip on the conditioning side of the seam
pub const fn overlap_range(mode: GrowthMode, contract: &GrowthContract) -> Range<u32> {
    let half = contract.half();
    match mode.direction() {
        Direction::Forward => (half - contract.overlap)..half,
        Direction::Reverse => half..(half + contract.overlap),
    }
}

/// Split a tile at the midpoint into (conditioning half, new half)
///
/// The split ignores overlap and advance: the generator contract is always
/// half context, half new.
///
/// # Errors
///
/// Returns a dimension error if the tile is not square at `tile_size`
pub fn split_tile(tile: &Tile, mode: GrowthMode, contract: &GrowthContract) -> Result<(Tile, Tile)> {
    check_tile(tile, contract)?;
    let axis = mode.axis();
    let conditioning = raster::span(tile, axis, conditioning_range(mode, contract));
    let fresh = raster::span(tile, axis, new_range(mode, contract));
    Ok((conditioning, fresh))
}

/// Crop the patch window of a tile
///
/// # Errors
///
/// Returns a dimension error if the tile is not square at `tile_size`
pub fn patch_window(tile: &Tile, mode: GrowthMode, contract: &GrowthContract) -> Result<Tile> {
    check_tile(tile, contract)?;
    Ok(raster::span(tile, mode.axis(), patch_range(mode, contract)))
}
