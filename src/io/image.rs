//! PNG loading and in-memory encoding

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::io::error::{GrowError, Result};

/// Load an image from disk as 8-bit RGB
///
/// Alpha is dropped, grayscale is expanded.
///
/// # Errors
///
/// Returns a not-found error if `path` does not exist, or a decode error
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(GrowError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let image = image::open(path).map_err(|source| GrowError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Read only the header of an image to get its dimensions
///
/// # Errors
///
/// Returns a not-found error if `path` does not exist, or a decode error
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    if !path.exists() {
        return Err(GrowError::NotFound {
            path: path.to_path_buf(),
        });
    }
    image::image_dimensions(path).map_err(|source| GrowError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode an RGB image as PNG bytes
///
/// # Errors
///
/// Returns an encode error naming `artifact`
pub fn encode_png(image: &RgbImage, artifact: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|source| GrowError::ImageEncode {
            artifact: artifact.to_string(),
            source,
        })?;
    Ok(bytes)
}

/// Encode an RGBA image as PNG bytes
///
/// # Errors
///
/// Returns an encode error naming `artifact`
pub fn encode_rgba_png(image: &RgbaImage, artifact: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|source| GrowError::ImageEncode {
            artifact: artifact.to_string(),
            source,
        })?;
    Ok(bytes)
}
