//! Overlap/advance contract shared by every geometric operation
//!
//! The generator is always asked for "half context, half new". How much of the
//! context half is trusted (`keep`) and how much is handed back for blending
//! (`overlap`) is configured here, independently of what the generator sees.

use serde::{Deserialize, Serialize};

use crate::io::configuration::{BAND_SIZE, DEFAULT_ADVANCE, DEFAULT_OVERLAP, TILE_SIZE};
use crate::io::error::{Result, invalid_parameter};

/// Tile, band, overlap and advance sizes in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthContract {
    /// Edge length of a tile and of the canvas cross axis
    pub tile_size: u32,
    /// Thickness of the conditioning band
    pub band_size: u32,
    /// Frontier pixels overwritten by each step
    pub overlap: u32,
    /// Net growth per committed step
    pub advance: u32,
}

impl Default for GrowthContract {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            band_size: BAND_SIZE,
            overlap: DEFAULT_OVERLAP,
            advance: DEFAULT_ADVANCE,
        }
    }
}

impl GrowthContract {
    /// Midpoint split of a tile along the growth axis
    pub const fn half(&self) -> u32 {
        self.tile_size / 2
    }

    /// Thickness of the must-preserve region of the conditioning half
    pub const fn keep(&self) -> u32 {
        self.half().saturating_sub(self.overlap)
    }

    /// Thickness of the patch window pasted onto the canvas
    pub const fn patch_len(&self) -> u32 {
        self.overlap + self.advance
    }

    /// Check that the sizes describe a usable contract
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `tile_size` is zero or odd
    /// - `band_size` differs from half the tile
    /// - `overlap` exceeds half the tile
    /// - `advance` is zero or exceeds half the tile
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 || self.tile_size % 2 != 0 {
            return Err(invalid_parameter(
                "tile_size",
                &self.tile_size,
                &"must be a positive even number",
            ));
        }
        if self.band_size != self.half() {
            return Err(invalid_parameter(
                "band_size",
                &self.band_size,
                &format!("must equal half the tile ({})", self.half()),
            ));
        }
        if self.overlap > self.half() {
            return Err(invalid_parameter(
                "overlap",
                &self.overlap,
                &format!("must not exceed half the tile ({})", self.half()),
            ));
        }
        if self.advance == 0 || self.advance > self.half() {
            return Err(invalid_parameter(
                "advance",
                &self.advance,
                &format!("must be in 1..={}", self.half()),
            ));
        }
        Ok(())
    }
}
