//! Hard-replace gluing of a tile's patch window onto the canvas

use crate::geometry::band::check_canvas;
use crate::geometry::contract::GrowthContract;
use crate::geometry::mode::{Direction, GrowthMode};
use crate::geometry::raster::{self, Canvas, Tile};
use crate::geometry::tile::patch_window;
use crate::io::error::{Result, dimension_error};

/// Canvas size after one committed step of `advance` pixels
pub const fn expected_next_size(size: (u32, u32), mode: GrowthMode, advance: u32) -> (u32, u32) {
    let axis = mode.axis();
    axis.size(axis.along(size) + advance, axis.across(size))
}

/// Glue the patch window of `tile` onto `canvas`, growing it by `advance`
///
/// Forward modes keep the old canvas at the origin and paste the patch at
/// `old_len - overlap`. Reverse modes shift the old canvas by `advance` and
/// paste the patch at the origin, so its tail lands on the first `overlap`
/// pixels of the old content.
///
/// # Errors
///
/// Returns a dimension error if:
/// - The canvas cross axis is not the tile size
/// - The canvas is shorter than the overlap along the growth axis
/// - The tile is not square at the tile size
pub fn glue(
    canvas: &Canvas,
    tile: &Tile,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<Canvas> {
    check_canvas(canvas, mode, contract)?;
    let axis = mode.axis();
    let old_len = raster::along(canvas, axis);
    if old_len < contract.overlap {
        return Err(dimension_error(
            "canvas growth axis",
            axis.size(contract.overlap, contract.tile_size),
            canvas.dimensions(),
        ));
    }

    let patch = patch_window(tile, mode, contract)?;
    let mut out = raster::blank(axis, old_len + contract.advance, contract.tile_size);

    match mode.direction() {
        Direction::Forward => {
            raster::paste_span(&mut out, canvas, axis, 0);
            raster::paste_span(&mut out, &patch, axis, old_len - contract.overlap);
        }
        Direction::Reverse => {
            raster::paste_span(&mut out, canvas, axis, contract.advance);
            raster::paste_span(&mut out, &patch, axis, 0);
        }
    }

    tracing::debug!(
        %mode,
        before = ?canvas.dimensions(),
        after = ?out.dimensions(),
        overlap = contract.overlap,
        advance = contract.advance,
        "Glued tile patch"
    );
    Ok(out)
}
