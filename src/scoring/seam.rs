//! Seam continuity score between the canvas frontier and a candidate tile
//!
//! Both strips are `overlap` thick and touch the seam from opposite sides: the
//! canvas strip ends at the frontier, the tile strip starts the generated half.
//! Edge maps are compared by distance from the seam, so the pixel touching the
//! seam on one side is paired with the pixel touching it on the other.

use image::RgbImage;
use ndarray::{Array2, Zip, s};

use crate::geometry::band::check_canvas;
use crate::geometry::mode::{Axis, Direction};
use crate::geometry::raster::{self, Canvas, Tile};
use crate::geometry::tile::check_tile;
use crate::geometry::{GrowthContract, GrowthMode};
use crate::io::configuration::{SEAM_WEIGHT_FAR, SEAM_WEIGHT_NEAR};
use crate::io::error::{Result, dimension_error};
use crate::math::ramp::linspace;
use crate::scoring::edges::{luminance, sobel_magnitude};

/// Strips on either side of the seam
#[derive(Debug, Clone)]
pub struct SeamStrips {
    /// Canvas pixels at the frontier
    pub canvas_side: RgbImage,
    /// Generated tile pixels adjacent to the seam
    pub tile_side: RgbImage,
}

/// Cut the two scoring strips for `tile` against `canvas`
///
/// # Errors
///
/// Returns a dimension error if the canvas cross axis is wrong, the canvas is
/// thinner than the overlap, or the tile is not square at the tile size
pub fn seam_strips(
    canvas: &Canvas,
    tile: &Tile,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<SeamStrips> {
    check_canvas(canvas, mode, contract)?;
    check_tile(tile, contract)?;

    let axis = mode.axis();
    let depth = contract.overlap;
    let len = raster::along(canvas, axis);
    if len < depth {
        return Err(dimension_error(
            "canvas growth axis",
            axis.size(depth, contract.tile_size),
            canvas.dimensions(),
        ));
    }

    let half = contract.half();
    let (canvas_range, tile_range) = match mode.direction() {
        Direction::Forward => ((len - depth)..len, half..(half + depth)),
        Direction::Reverse => (0..depth, (half - depth)..half),
    };

    Ok(SeamStrips {
        canvas_side: raster::span(canvas, axis, canvas_range),
        tile_side: raster::span(tile, axis, tile_range),
    })
}

/// Edge magnitudes shaped (across, depth) with depth 0 touching the seam
pub fn oriented_edges(strip: &RgbImage, axis: Axis, seam_first: bool) -> Array2<f32> {
    let edges = sobel_magnitude(&luminance(strip));
    let across_by_depth = match axis {
        Axis::Horizontal => edges,
        Axis::Vertical => edges.reversed_axes(),
    };
    if seam_first {
        across_by_depth
    } else {
        across_by_depth.slice(s![.., ..;-1]).to_owned()
    }
}

/// Per-depth weights, 1.0 at the seam falling linearly to 0.2 at the far edge
pub fn seam_weights(depth: usize) -> Vec<f64> {
    linspace(SEAM_WEIGHT_NEAR, SEAM_WEIGHT_FAR, depth)
}

/// Negative weighted mean-squared difference of two oriented edge maps
///
/// Returns 0 for identical maps and for empty ones.
pub fn weighted_edge_score(canvas_edges: &Array2<f32>, tile_edges: &Array2<f32>) -> f64 {
    let (across, depth) = canvas_edges.dim();
    if across == 0 || depth == 0 || tile_edges.dim() != (across, depth) {
        return 0.0;
    }

    let weights = seam_weights(depth);
    let mut weighted_sum = 0.0;
    Zip::indexed(canvas_edges)
        .and(tile_edges)
        .for_each(|(_, d), &c, &t| {
            let diff = f64::from(c - t);
            weighted_sum += weights.get(d).copied().unwrap_or(SEAM_WEIGHT_FAR) * diff * diff;
        });
    let total_weight = weights.iter().sum::<f64>() * across as f64;
    -(weighted_sum / total_weight)
}

/// Score `tile` for edge continuity against the frontier of `canvas`
///
/// Higher is better; 0 is the unattainable upper bound for identical strips.
///
/// # Errors
///
/// Returns a dimension error under the same conditions as [`seam_strips`]
pub fn score_seam(
    canvas: &Canvas,
    tile: &Tile,
    mode: GrowthMode,
    contract: &GrowthContract,
) -> Result<f64> {
    let strips = seam_strips(canvas, tile, mode, contract)?;
    let axis = mode.axis();
    let (canvas_seam_first, tile_seam_first) = match mode.direction() {
        Direction::Forward => (false, true),
        Direction::Reverse => (true, false),
    };

    let canvas_edges = oriented_edges(&strips.canvas_side, axis, canvas_seam_first);
    let tile_edges = oriented_edges(&strips.tile_side, axis, tile_seam_first);
    let score = weighted_edge_score(&canvas_edges, &tile_edges);

    tracing::debug!(%mode, score, "Scored seam continuity");
    Ok(score)
}
