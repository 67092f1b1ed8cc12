//! Deterministic offline generator for tests, demos and dry runs

use image::Rgb;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::conditioning::{MaskClass, ReferenceTile};
use crate::generator::client::{GeneratorError, TileGenerator, TileRequest};
use crate::geometry::band::check_band;
use crate::geometry::raster::{self, Tile};
use crate::geometry::tile::{conditioning_range, new_range};
use crate::geometry::GrowthContract;
use crate::math::hash::fnv1a64;
use crate::math::ramp::blend_channel;

/// Copy preserved reference pixels and blend graded ones by their trust
fn honor_mask(tile: &mut Tile, reference: &ReferenceTile) {
    for (x, y, pixel) in tile.enumerate_pixels_mut() {
        let Some(source) = reference.reference.get_pixel_checked(x, y) else {
            continue;
        };
        match reference.class_at(x, y) {
            Some(MaskClass::Preserve) => *pixel = *source,
            Some(MaskClass::Graded(trust)) => {
                for (channel, over) in pixel.0.iter_mut().zip(source.0) {
                    *channel = blend_channel(*channel, over, trust);
                }
            }
            Some(MaskClass::Editable) | None => {}
        }
    }
}

/// How the mock fills the new half of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFill {
    /// Seeded grayscale noise
    Noise,
    /// The band mirrored across the seam, which makes the seam continuous
    Mirror,
    /// A single color
    Solid([u8; 3]),
}

/// Generator that copies the band into the conditioning half verbatim and
/// fills the new half deterministically from the request
///
/// With a reference attached it follows the mask like an image-conditioned
/// model: preserved pixels come from the reference, graded ones are blended.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    contract: GrowthContract,
    fill: MockFill,
}

impl MockGenerator {
    /// Create a mock for tiles of `contract` using `fill`
    pub const fn new(contract: GrowthContract, fill: MockFill) -> Self {
        Self { contract, fill }
    }

    /// Stable seed derived from mode, step, prompt and candidate index
    pub fn seed_for(request: &TileRequest<'_>) -> u64 {
        let key = format!(
            "{}|{}|{}|{}",
            request.mode, request.step_index, request.prompt, request.candidate_index
        );
        fnv1a64(key.as_bytes())
    }
}

impl TileGenerator for MockGenerator {
    fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError> {
        check_band(request.band, request.mode, &self.contract)
            .map_err(|e| GeneratorError::permanent(e.to_string()))?;

        let contract = &self.contract;
        let axis = request.mode.axis();
        let half = contract.half();
        let mut tile = raster::blank(axis, contract.tile_size, contract.tile_size);

        let fresh = match self.fill {
            MockFill::Noise => {
                let mut rng = StdRng::seed_from_u64(Self::seed_for(request));
                let mut fresh = raster::blank(axis, half, contract.tile_size);
                for pixel in fresh.pixels_mut() {
                    let value: u8 = rng.random();
                    *pixel = Rgb([value, value, value]);
                }
                fresh
            }
            MockFill::Mirror => raster::flip_along(request.band, axis),
            MockFill::Solid(color) => {
                let mut fresh = raster::blank(axis, half, contract.tile_size);
                for pixel in fresh.pixels_mut() {
                    *pixel = Rgb(color);
                }
                fresh
            }
        };

        raster::paste_span(&mut tile, &fresh, axis, new_range(request.mode, contract).start);
        raster::paste_span(
            &mut tile,
            request.band,
            axis,
            conditioning_range(request.mode, contract).start,
        );
        if let Some(reference) = request.reference {
            honor_mask(&mut tile, reference);
        }
        Ok(tile)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
