//! Grayscale conversion and Sobel edge magnitude

use image::RgbImage;
use ndarray::Array2;

/// Luma in `[0, 1]` with ITU-R 601 weights, shaped (rows, cols)
pub fn luminance(image: &RgbImage) -> Array2<f32> {
    let (width, height) = image.dimensions();
    let mut gray = Array2::zeros((height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        if let Some(value) = gray.get_mut((y as usize, x as usize)) {
            *value = luma / 255.0;
        }
    }
    gray
}

/// Sobel gradient magnitude with edge-replicated borders
pub fn sobel_magnitude(gray: &Array2<f32>) -> Array2<f32> {
    const KX: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
    const KY: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
    const OFFSETS: [isize; 3] = [-1, 0, 1];

    let (rows, cols) = gray.dim();
    let mut magnitude = Array2::zeros((rows, cols));
    if rows == 0 || cols == 0 {
        return magnitude;
    }

    for row in 0..rows {
        for col in 0..cols {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for (kx_row, (ky_row, dy)) in KX.iter().zip(KY.iter().zip(OFFSETS)) {
                let r = row.saturating_add_signed(dy).min(rows - 1);
                for (kx, (ky, dx)) in kx_row.iter().zip(ky_row.iter().zip(OFFSETS)) {
                    let c = col.saturating_add_signed(dx).min(cols - 1);
                    let value = gray.get((r, c)).copied().unwrap_or(0.0);
                    gx += kx * value;
                    gy += ky * value;
                }
            }
            if let Some(cell) = magnitude.get_mut((row, col)) {
                *cell = f32::hypot(gx, gy);
            }
        }
    }
    magnitude
}
