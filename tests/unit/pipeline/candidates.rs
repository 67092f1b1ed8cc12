//! Tests for candidate evaluation, fan-out and winner selection

#[cfg(test)]
mod tests {
    use crate::{coordinate_image, small_contract, solid_image};
    use image::Rgb;
    use tilegrow::generator::client::{
        GeneratorError, GeneratorErrorKind, TileGenerator, TileRequest,
    };
    use tilegrow::generator::mock::{MockFill, MockGenerator};
    use tilegrow::geometry::band::extract_band;
    use tilegrow::geometry::{GrowthMode, Tile};
    use tilegrow::io::error::FailureClass;
    use tilegrow::pipeline::candidates::{
        CandidateEvaluation, CandidatePolicy, CandidateReport, CandidateRound, evaluate_candidate,
        run_candidates, select_winner,
    };

    fn evaluation(index: usize, score: f64) -> CandidateEvaluation {
        CandidateEvaluation {
            index,
            returned: None,
            prepared: Some(solid_image(32, 32, [0, 0, 0])),
            score,
            failure: None,
        }
    }

    /// Mirror for candidate 1, noise for everyone else
    struct Mixed {
        mirror: MockGenerator,
        noise: MockGenerator,
    }

    impl TileGenerator for Mixed {
        fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError> {
            if request.candidate_index == 1 {
                self.mirror.generate_tile(request)
            } else {
                self.noise.generate_tile(request)
            }
        }
    }

    // Tests generator failures become classified, unscored candidates
    // Verified by propagating generator errors
    #[test]
    fn test_generator_failure_recorded() {
        let contract = small_contract();
        let canvas = coordinate_image(32, 32);
        let band = extract_band(&canvas, GrowthMode::GrowRight, &contract).expect("band");
        let outcome = Err(GeneratorError::new(GeneratorErrorKind::SafetyRefusal, "no"));
        let evaluation = evaluate_candidate(
            2,
            outcome,
            &canvas,
            &band,
            GrowthMode::GrowRight,
            &contract,
            CandidatePolicy::default(),
        )
        .expect("evaluation");
        assert!(!evaluation.is_viable());
        assert_eq!(evaluation.index, 2);
        assert!(evaluation.score.is_infinite() && evaluation.score < 0.0);
        assert_eq!(
            evaluation.failure.map(|f| f.class),
            Some(FailureClass::Generator(GeneratorErrorKind::SafetyRefusal))
        );
    }

    // Tests wrong-sized tiles are dimension failures that keep the raw tile
    // Verified by resizing tiles instead of rejecting them
    #[test]
    fn test_wrong_size_tile() {
        let contract = small_contract();
        let canvas = coordinate_image(32, 32);
        let band = extract_band(&canvas, GrowthMode::GrowDown, &contract).expect("band");
        let evaluation = evaluate_candidate(
            0,
            Ok(solid_image(32, 30, [0, 0, 0])),
            &canvas,
            &band,
            GrowthMode::GrowDown,
            &contract,
            CandidatePolicy::default(),
        )
        .expect("evaluation");
        assert!(evaluation.returned.is_some());
        assert!(evaluation.prepared.is_none());
        assert_eq!(evaluation.failure.map(|f| f.class), Some(FailureClass::Dimension));
    }

    // Tests identity enforcement with and without post-enforcement
    // Verified by checking identity before post-enforcement
    #[test]
    fn test_identity_policy() {
        let contract = small_contract();
        let canvas = coordinate_image(32, 32);
        let mode = GrowthMode::GrowRight;
        let band = extract_band(&canvas, mode, &contract).expect("band");
        let mock = MockGenerator::new(contract, MockFill::Noise);
        let mut tile = mock
            .generate_tile(&TileRequest {
                band: &band,
                mode,
                prompt: "",
                step_index: 1,
                candidate_index: 0,
                reference: None,
            })
            .expect("tile");
        // Corrupt one keep pixel
        tile.put_pixel(0, 0, Rgb([255, 0, 255]));

        let strict = CandidatePolicy {
            post_enforce_keep: false,
            enforce_band_identity: true,
        };
        let rejected =
            evaluate_candidate(0, Ok(tile.clone()), &canvas, &band, mode, &contract, strict)
                .expect("evaluation");
        assert_eq!(rejected.failure.map(|f| f.class), Some(FailureClass::BandIdentity));

        let repaired = evaluate_candidate(
            0,
            Ok(tile.clone()),
            &canvas,
            &band,
            mode,
            &contract,
            CandidatePolicy::default(),
        )
        .expect("evaluation");
        assert!(repaired.is_viable());
        assert_eq!(repaired.returned.as_ref(), Some(&tile));
        assert_ne!(repaired.prepared.as_ref(), Some(&tile));

        let lenient = CandidatePolicy {
            post_enforce_keep: false,
            enforce_band_identity: false,
        };
        let accepted = evaluate_candidate(0, Ok(tile), &canvas, &band, mode, &contract, lenient)
            .expect("evaluation");
        assert!(accepted.is_viable());
    }

    // Tests the highest score wins and ties go to the lowest index
    // Verified by keeping the last maximum
    #[test]
    fn test_select_winner() {
        let mut failed = evaluation(3, f64::NEG_INFINITY);
        failed.prepared = None;
        let evaluations = vec![
            evaluation(0, -3.0),
            evaluation(1, -1.0),
            evaluation(2, -1.0),
            failed,
        ];
        assert_eq!(select_winner(&evaluations), Some(1));
        assert_eq!(select_winner(&evaluations[3..]), None);
        assert_eq!(select_winner(&[]), None);
    }

    // Tests parallel fan-out matches sequential results in index order
    // Verified by collecting in completion order
    #[test]
    fn test_parallel_matches_sequential() {
        let contract = small_contract();
        let canvas = coordinate_image(32, 32);
        let mode = GrowthMode::GrowRight;
        let band = extract_band(&canvas, mode, &contract).expect("band");
        let generator = Mixed {
            mirror: MockGenerator::new(contract, MockFill::Mirror),
            noise: MockGenerator::new(contract, MockFill::Noise),
        };
        let round = CandidateRound {
            canvas: &canvas,
            request: TileRequest {
                band: &band,
                mode,
                prompt: "reef",
                step_index: 1,
                candidate_index: 0,
                reference: None,
            },
            contract: &contract,
            policy: CandidatePolicy::default(),
        };

        let sequential = run_candidates(&generator, &round, 4, false).expect("sequential");
        let parallel = run_candidates(&generator, &round, 4, true).expect("parallel");
        let indices: Vec<usize> = parallel.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.score.to_bits(), b.score.to_bits());
            assert_eq!(a.prepared, b.prepared);
        }
        // The mirrored candidate continues the seam best
        assert_eq!(select_winner(&sequential), Some(1));
        assert_eq!(select_winner(&parallel), Some(1));
    }

    // Tests reports omit scores of failed candidates
    // Verified by reporting negative infinity
    #[test]
    fn test_candidate_report() {
        let mut failed = evaluation(1, f64::NEG_INFINITY);
        failed.prepared = None;
        let report = CandidateReport::from(&failed);
        assert_eq!(report.score, None);
        let report = CandidateReport::from(&evaluation(0, -0.5));
        assert_eq!(report.score, Some(-0.5));
        assert!(serde_json::to_string(&report).is_ok());
    }
}
