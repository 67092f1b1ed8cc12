//! Reference canvas and preserve/edit mask for image-conditioned generators
//!
//! The mask encodes trust per pixel as an 8-bit value: 255 must be preserved,
//! 0 is freely editable, anything in between is graded. Only the keep region
//! of the conditioning half is ever 255.

use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use crate::conditioning::scaffold::{ScaffoldConfig, low_frequency};
use crate::geometry::band::check_band;
use crate::geometry::identity::keep_range_in_tile;
use crate::geometry::mode::{Axis, Direction};
use crate::geometry::raster::{self, Band};
use crate::geometry::tile::{conditioning_range, new_range, overlap_range};
use crate::geometry::{GrowthContract, GrowthMode};
use crate::io::configuration::{CUE_INSET, CUE_THICKNESS};
use crate::io::error::Result;
use crate::math::ramp::interior_falling_ramp;

/// Trust level of one mask pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskClass {
    /// Must come back byte-identical
    Preserve,
    /// Free for the generator to repaint
    Editable,
    /// Partial trust; higher values lean toward preserve
    Graded(u8),
}

impl MaskClass {
    /// Classify a mask value
    pub const fn from_value(value: u8) -> Self {
        match value {
            255 => Self::Preserve,
            0 => Self::Editable,
            other => Self::Graded(other),
        }
    }
}

/// Treatment of the overlap strip next to the seam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapStyle {
    /// Fully editable
    Editable,
    /// Graded from preserve toward free moving toward the seam
    #[default]
    Ramp,
}

/// Thin line hinting that edges continue past the seam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueConfig {
    /// Distance from the keep boundary into the overlap strip
    pub inset: u32,
    /// Line thickness along the growth axis
    pub thickness: u32,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            inset: CUE_INSET,
            thickness: CUE_THICKNESS,
        }
    }
}

/// Options for building a reference/mask pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReferenceConfig {
    /// How the overlap strip is marked in the mask
    pub overlap_style: OverlapStyle,
    /// Low-frequency prior filled into the new half
    pub scaffold: Option<ScaffoldConfig>,
    /// Continuation cue drawn inside the overlap strip
    pub continuation_cue: Option<CueConfig>,
    /// Color of reference pixels not covered by the band or scaffold
    pub background: [u8; 3],
}

/// Reference canvas with the band embedded, plus its mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTile {
    /// Tile-sized RGB reference
    pub reference: RgbImage,
    /// Tile-sized trust mask
    pub mask: GrayImage,
}

impl ReferenceTile {
    /// Mask class at pixel (x, y), if inside the tile
    pub fn class_at(&self, x: u32, y: u32) -> Option<MaskClass> {
        self.mask
            .get_pixel_checked(x, y)
            .map(|pixel| MaskClass::from_value(pixel.0[0]))
    }

    /// Mask as RGBA with the trust value in the alpha channel
    pub fn mask_rgba(&self) -> RgbaImage {
        let (width, height) = self.mask.dimensions();
        RgbaImage::from_fn(width, height, |x, y| {
            let value = self.mask.get_pixel(x, y).0[0];
            Rgba([0, 0, 0, value])
        })
    }
}

/// Build the reference canvas and mask for `band`
///
/// # Errors
///
/// Returns a dimension error if the band shape does not match `mode`
pub fn build_reference(
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
    config: &ReferenceConfig,
) -> Result<ReferenceTile> {
    check_band(band, mode, contract)?;
    let axis = mode.axis();
    let size = contract.tile_size;

    let mut reference = RgbImage::from_pixel(size, size, Rgb(config.background));
    raster::paste_span(
        &mut reference,
        band,
        axis,
        conditioning_range(mode, contract).start,
    );

    if let Some(scaffold) = &config.scaffold {
        // Mirrored so content adjacent to the seam continues across it
        let prior = raster::flip_along(&low_frequency(band, scaffold), axis);
        raster::paste_span(&mut reference, &prior, axis, new_range(mode, contract).start);
    }

    if let Some(cue) = &config.continuation_cue {
        draw_cue(&mut reference, mode, contract, cue);
    }

    let profile = mask_profile(mode, contract, config.overlap_style);
    let mask = GrayImage::from_fn(size, size, |x, y| {
        let along = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        Luma([profile.get(along as usize).copied().unwrap_or(0)])
    });

    Ok(ReferenceTile { reference, mask })
}

/// Mask value at each position along the growth axis
fn mask_profile(mode: GrowthMode, contract: &GrowthContract, style: OverlapStyle) -> Vec<u8> {
    let mut profile = vec![0u8; contract.tile_size as usize];

    for position in keep_range_in_tile(mode, contract) {
        if let Some(value) = profile.get_mut(position as usize) {
            *value = 255;
        }
    }

    if style == OverlapStyle::Ramp {
        // Ordered from the keep boundary toward the seam
        let ramp = interior_falling_ramp(contract.overlap as usize);
        let strip = overlap_range(mode, contract);
        for (i, alpha) in ramp.into_iter().enumerate() {
            let position = match mode.direction() {
                Direction::Forward => strip.start as usize + i,
                Direction::Reverse => (strip.end as usize).saturating_sub(i + 1),
            };
            if let Some(value) = profile.get_mut(position) {
                *value = alpha;
            }
        }
    }

    profile
}

/// Invert a thin line of the overlap strip a few pixels past the keep boundary
fn draw_cue(reference: &mut RgbImage, mode: GrowthMode, contract: &GrowthContract, cue: &CueConfig) {
    let strip = overlap_range(mode, contract);
    if strip.is_empty() || cue.thickness == 0 {
        return;
    }
    let inset = cue.inset.min(contract.overlap.saturating_sub(1));
    let thickness = cue.thickness.min(contract.overlap - inset);
    let lines = match mode.direction() {
        Direction::Forward => (strip.start + inset)..(strip.start + inset + thickness),
        Direction::Reverse => (strip.end - inset - thickness)..(strip.end - inset),
    };

    let axis = mode.axis();
    let (width, height) = reference.dimensions();
    for along in lines {
        for across in 0..axis.across((width, height)) {
            let (x, y) = match axis {
                Axis::Horizontal => (along, across),
                Axis::Vertical => (across, along),
            };
            if let Some(pixel) = reference.get_pixel_mut_checked(x, y) {
                pixel.0 = pixel.0.map(|channel| 255 - channel);
            }
        }
    }
}
