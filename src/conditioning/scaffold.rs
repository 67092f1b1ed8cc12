//! Low-frequency scaffold used as a visual prior in editable regions

use image::{RgbImage, imageops, imageops::FilterType};

use crate::io::configuration::{SCAFFOLD_BLUR_SIGMA, SCAFFOLD_DOWNSAMPLE};

/// Downsample factor and blur strength of the scaffold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaffoldConfig {
    /// Integer shrink factor before upsampling back
    pub downsample: u32,
    /// Gaussian sigma applied after upsampling; zero disables the blur
    pub blur_sigma: f32,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            downsample: SCAFFOLD_DOWNSAMPLE,
            blur_sigma: SCAFFOLD_BLUR_SIGMA,
        }
    }
}

/// Downsample, upsample and blur `source`, keeping its dimensions
pub fn low_frequency(source: &RgbImage, config: &ScaffoldConfig) -> RgbImage {
    let (width, height) = source.dimensions();
    let factor = config.downsample.max(1);
    let small_width = (width / factor).max(1);
    let small_height = (height / factor).max(1);

    let small = imageops::resize(source, small_width, small_height, FilterType::Triangle);
    let restored = imageops::resize(&small, width, height, FilterType::Triangle);

    if config.blur_sigma > 0.0 {
        imageops::blur(&restored, config.blur_sigma)
    } else {
        restored
    }
}
