//! Tests for luminance and Sobel edge maps

#[cfg(test)]
mod tests {
    use crate::{coordinate_image, solid_image};
    use image::Rgb;
    use tilegrow::scoring::edges::{luminance, sobel_magnitude};

    // Tests luminance is shaped (rows, cols) and normalized
    // Verified by swapping width and height
    #[test]
    fn test_luminance_shape_and_range() {
        let gray = luminance(&coordinate_image(7, 3));
        assert_eq!(gray.dim(), (3, 7));
        assert!(gray.iter().all(|&v| (0.0..=1.0).contains(&v)));

        let white = luminance(&solid_image(2, 2, [255, 255, 255]));
        assert!(white.iter().all(|&v| (v - 1.0).abs() < 1e-4));
    }

    // Tests flat images have no edges, borders included
    // Verified by zero-padding instead of replicating borders
    #[test]
    fn test_flat_has_no_edges() {
        let edges = sobel_magnitude(&luminance(&solid_image(6, 5, [90, 40, 200])));
        assert!(edges.iter().all(|&v| v.abs() < 1e-6));
    }

    // Tests a vertical step responds on both sides of the step only
    // Verified by using the vertical kernel alone
    #[test]
    fn test_vertical_step() {
        let mut image = solid_image(6, 4, [0, 0, 0]);
        for y in 0..4 {
            for x in 3..6 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let edges = sobel_magnitude(&luminance(&image));
        assert!(edges[(1, 2)] > 1.0);
        assert!(edges[(1, 3)] > 1.0);
        assert!(edges[(1, 0)].abs() < 1e-6);
        assert!(edges[(1, 5)].abs() < 1e-6);
    }

    // Tests empty input yields an empty map
    // Verified by indexing before the emptiness check
    #[test]
    fn test_empty_input() {
        let edges = sobel_magnitude(&luminance(&solid_image(0, 0, [0, 0, 0])));
        assert_eq!(edges.dim(), (0, 0));
    }
}
