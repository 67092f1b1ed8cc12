//! Tests for the low-frequency scaffold

#[cfg(test)]
mod tests {
    use crate::{coordinate_image, solid_image};
    use tilegrow::conditioning::scaffold::{ScaffoldConfig, low_frequency};

    // Tests output keeps the input dimensions
    // Verified by returning the downsampled image
    #[test]
    fn test_dimensions_preserved() {
        let source = coordinate_image(24, 10);
        let scaffold = low_frequency(&source, &ScaffoldConfig::default());
        assert_eq!(scaffold.dimensions(), (24, 10));
    }

    // Tests flat images stay flat
    // Verified by skipping the upsample
    #[test]
    fn test_flat_stays_flat() {
        let source = solid_image(16, 16, [40, 80, 120]);
        let config = ScaffoldConfig {
            downsample: 4,
            blur_sigma: 0.0,
        };
        let scaffold = low_frequency(&source, &config);
        for pixel in scaffold.pixels() {
            for (got, want) in pixel.0.iter().zip([40u8, 80, 120]) {
                assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
            }
        }
    }

    // Tests high-frequency detail is suppressed
    // Verified by disabling the downsample
    #[test]
    fn test_detail_suppressed() {
        let mut source = solid_image(32, 32, [0, 0, 0]);
        for (x, y, pixel) in source.enumerate_pixels_mut() {
            if (x + y) % 2 == 0 {
                pixel.0 = [255, 255, 255];
            }
        }
        let scaffold = low_frequency(
            &source,
            &ScaffoldConfig {
                downsample: 8,
                blur_sigma: 2.0,
            },
        );
        let center = scaffold.get_pixel(16, 16).0[0];
        assert!((60..=195).contains(&center), "checkerboard should average out, got {center}");
    }
}
