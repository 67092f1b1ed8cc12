//! Tests for tile halves and patch windows

#[cfg(test)]
mod tests {
    use crate::{coordinate_image, small_contract};
    use tilegrow::GrowError;
    use tilegrow::geometry::GrowthMode;
    use tilegrow::geometry::tile::{
        check_tile, conditioning_range, new_range, overlap_range, patch_range, patch_window,
        split_tile,
    };

    // Tests forward ranges sit as documented
    // Verified by swapping conditioning and new halves
    #[test]
    fn test_forward_ranges() {
        let contract = small_contract();
        let mode = GrowthMode::GrowRight;
        assert_eq!(conditioning_range(mode, &contract), 0..16);
        assert_eq!(new_range(mode, &contract), 16..32);
        assert_eq!(patch_range(mode, &contract), 8..32);
        assert_eq!(overlap_range(mode, &contract), 8..16);
    }

    // Tests reverse ranges mirror the forward ones
    // Verified by reusing the forward patch window
    #[test]
    fn test_reverse_ranges() {
        let contract = small_contract();
        let mode = GrowthMode::GrowUp;
        assert_eq!(conditioning_range(mode, &contract), 16..32);
        assert_eq!(new_range(mode, &contract), 0..16);
        assert_eq!(patch_range(mode, &contract), 0..24);
        assert_eq!(overlap_range(mode, &contract), 16..24);
    }

    // Tests split halves have half shape and the right pixels
    // Verified by splitting at the overlap boundary
    #[test]
    fn test_split_tile() {
        let contract = small_contract();
        let tile = coordinate_image(32, 32);
        let (conditioning, fresh) =
            split_tile(&tile, GrowthMode::GrowLeft, &contract).expect("split");
        assert_eq!(conditioning.dimensions(), (16, 32));
        assert_eq!(fresh.dimensions(), (16, 32));
        assert_eq!(conditioning.get_pixel(0, 4), tile.get_pixel(16, 4));
        assert_eq!(fresh.get_pixel(0, 4), tile.get_pixel(0, 4));

        let (conditioning, fresh) =
            split_tile(&tile, GrowthMode::GrowDown, &contract).expect("split");
        assert_eq!(conditioning.dimensions(), (32, 16));
        assert_eq!(fresh.get_pixel(2, 0), tile.get_pixel(2, 16));
    }

    // Tests the patch window length is overlap plus advance
    // Verified by using half the tile as the patch
    #[test]
    fn test_patch_window() {
        let contract = small_contract();
        let tile = coordinate_image(32, 32);
        let patch = patch_window(&tile, GrowthMode::GrowRight, &contract).expect("patch");
        assert_eq!(patch.dimensions(), (24, 32));
        assert_eq!(patch.get_pixel(0, 0), tile.get_pixel(8, 0));
    }

    // Tests non-square tiles are dimension errors
    // Verified by only checking the width
    #[test]
    fn test_bad_tile_shape() {
        let contract = small_contract();
        let tile = coordinate_image(32, 30);
        assert!(matches!(check_tile(&tile, &contract), Err(GrowError::Dimension { .. })));
        assert!(split_tile(&tile, GrowthMode::GrowRight, &contract).is_err());
    }
}
