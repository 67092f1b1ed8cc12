//! Tests for session creation, opening and step persistence

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{coordinate_image, small_contract};
    use tilegrow::GrowError;
    use tilegrow::conditioning::ReferenceConfig;
    use tilegrow::generator::mock::{MockFill, MockGenerator};
    use tilegrow::geometry::{GrowthContract, GrowthMode};
    use tilegrow::io::error::FailureClass;
    use tilegrow::pipeline::step::StepOptions;
    use tilegrow::session::artifacts::{ScoreReport, StepDirectory};
    use tilegrow::session::{SessionConfig, SessionPhase, SessionStore, StepStatus};

    fn config(id: &str) -> SessionConfig {
        SessionConfig {
            contract: small_contract(),
            session_id: Some(id.to_string()),
            ..SessionConfig::default()
        }
    }

    // Tests creation writes the pointer, a committed step 0 and the state
    // Verified by skipping the initial snapshot
    #[test]
    fn test_create_layout() {
        let dir = tempfile::tempdir().unwrap();
        let initial = coordinate_image(32, 32);
        let store =
            SessionStore::create(dir.path(), &initial, GrowthMode::GrowRight, &config("s1"))
                .unwrap();

        let root = store.root().to_path_buf();
        assert!(root.is_absolute());
        assert!(root.ends_with("s1"));
        assert!(root.join("session_state.json").is_file());
        assert_eq!(store.load_canvas().unwrap(), initial);
        let step0 = StepDirectory::new(store.step_dir(0));
        assert!(step0.is_committed());
        assert!(step0.file("canvas_initial.png").is_file());
        assert_eq!(store.step_index(), 0);
        assert_eq!(store.canvas_size(), (32, 32));
        assert_eq!(store.phase(), SessionPhase::Created);
        assert_eq!(store.contract(), small_contract());
    }

    // Tests creation validates the initial canvas, the contract and uniqueness
    // Verified by overwriting an existing session
    #[test]
    fn test_create_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = SessionStore::create(
            dir.path(),
            &coordinate_image(32, 16),
            GrowthMode::GrowDown,
            &config("bad"),
        );
        assert!(matches!(result, Err(GrowError::Dimension { .. })));

        let mut odd = config("odd");
        odd.contract = GrowthContract {
            advance: 0,
            ..small_contract()
        };
        let result =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowDown, &odd);
        assert!(matches!(result, Err(GrowError::InvalidParameter { .. })));

        SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowDown, &config("dup"))
            .unwrap();
        let result = SessionStore::create(
            dir.path(),
            &coordinate_image(32, 32),
            GrowthMode::GrowDown,
            &config("dup"),
        );
        assert!(matches!(result, Err(GrowError::Consistency { .. })));
    }

    // Tests a random identifier is used when none is given
    // Verified by using a fixed default name
    #[test]
    fn test_generated_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            contract: small_contract(),
            ..SessionConfig::default()
        };
        let a = SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowUp, &config)
            .unwrap();
        let b = SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowUp, &config)
            .unwrap();
        assert_ne!(a.state().session_id, b.state().session_id);
        assert_eq!(a.state().session_id.len(), 36);
    }

    // Tests opening returns the persisted state and rejects foreign roots
    // Verified by skipping the root comparison
    #[test]
    fn test_open() {
        let dir = tempfile::tempdir().unwrap();
        let created =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowLeft, &config("o"))
                .unwrap();
        let opened = SessionStore::open(created.root()).unwrap();
        assert_eq!(opened.state(), created.state());
        assert_eq!(opened.mode(), GrowthMode::GrowLeft);

        assert!(matches!(
            SessionStore::open(&dir.path().join("missing")),
            Err(GrowError::NotFound { .. })
        ));

        let copy = dir.path().join("copy");
        fs::create_dir(&copy).unwrap();
        fs::copy(
            created.root().join("session_state.json"),
            copy.join("session_state.json"),
        )
        .unwrap();
        assert!(matches!(
            SessionStore::open(&copy),
            Err(GrowError::Consistency { .. })
        ));
    }

    // Tests a committed step writes every artifact and advances the state
    // Verified by writing the marker before the state
    #[test]
    fn test_execute_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowRight, &config("c"))
                .unwrap();
        let generator = MockGenerator::new(small_contract(), MockFill::Noise);
        let options = StepOptions {
            candidate_count: 2,
            reference: Some(ReferenceConfig::default()),
            ..StepOptions::default()
        };
        let result = store.execute_step(" surf \r\n", &generator, &options).unwrap();

        assert_eq!(result.status, StepStatus::Committed);
        assert_eq!(result.step_index, 1);
        assert_eq!(result.canvas_size_before, (32, 32));
        assert_eq!(result.canvas_size_after, (48, 32));
        assert_eq!(store.phase(), SessionPhase::StepCommitted);
        assert_eq!(store.step_index(), 1);
        assert_eq!(store.load_canvas().unwrap().dimensions(), (48, 32));

        let step = StepDirectory::new(&result.step_dir);
        for name in [
            "prompt.txt",
            "conditioning_band.png",
            "reference.png",
            "mask.png",
            "candidate_00.png",
            "candidate_01.png",
            "scores.json",
            "tile_full.png",
            "tile_patch.png",
            "new_half.png",
            "canvas_before.png",
            "canvas_after.png",
            "committed.ok",
        ] {
            assert!(step.file(name).is_file(), "missing {name}");
        }
        assert_eq!(fs::read_to_string(step.file("prompt.txt")).unwrap(), "surf\n");
        let scores: ScoreReport =
            serde_json::from_str(&fs::read_to_string(step.file("scores.json")).unwrap()).unwrap();
        assert_eq!(scores.candidates.len(), 2);
        assert_eq!(scores.generator, "mock");
        assert!(scores.winner.is_some());

        let reopened = SessionStore::open(store.root()).unwrap();
        assert_eq!(reopened.step_index(), 1);
        assert_eq!(reopened.canvas_size(), (48, 32));
    }

    // Tests a rejected step leaves the canvas and state untouched
    // Verified by advancing the index on rejection
    #[test]
    fn test_execute_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowUp, &config("r"))
                .unwrap();
        let state_before = fs::read(store.root().join("session_state.json")).unwrap();
        let canvas_before = fs::read(store.canvas_path()).unwrap();

        // Wrong contract makes every tile the wrong size
        let generator = MockGenerator::new(
            GrowthContract {
                tile_size: 64,
                band_size: 32,
                overlap: 8,
                advance: 16,
            },
            MockFill::Noise,
        );
        let result = store
            .execute_step("fog", &generator, &StepOptions::default())
            .unwrap();

        assert_eq!(result.status, StepStatus::Rejected);
        assert_eq!(result.canvas_size_after, result.canvas_size_before);
        assert!(result.rejection.is_some());
        assert_eq!(store.phase(), SessionPhase::StepRejected);
        assert_eq!(store.step_index(), 0);
        assert_eq!(fs::read(store.root().join("session_state.json")).unwrap(), state_before);
        assert_eq!(fs::read(store.canvas_path()).unwrap(), canvas_before);

        let step = StepDirectory::new(&result.step_dir);
        assert!(!step.is_committed());
        let record = step.read_rejection().unwrap().unwrap();
        assert_eq!(record.step_index, 1);
        assert_eq!(
            Some(record.rejection.class),
            result.rejection.map(|r| r.class)
        );
    }

    // Tests a retry archives the rejected attempt and commits at the same index
    // Verified by committing over the rejected directory
    #[test]
    fn test_retry_after_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowDown, &config("t"))
                .unwrap();
        let strict = StepOptions {
            post_enforce_keep: false,
            ..StepOptions::default()
        };
        let wrong = MockGenerator::new(
            GrowthContract {
                tile_size: 16,
                band_size: 8,
                overlap: 4,
                advance: 8,
            },
            MockFill::Noise,
        );
        let rejected = store.execute_step("ice", &wrong, &strict).unwrap();
        assert_eq!(
            rejected.rejection.map(|r| r.class),
            Some(FailureClass::Generator(
                tilegrow::generator::client::GeneratorErrorKind::Permanent
            ))
        );

        let generator = MockGenerator::new(small_contract(), MockFill::Mirror);
        let committed = store.execute_step("ice", &generator, &strict).unwrap();
        assert!(committed.is_committed());
        assert_eq!(committed.step_index, 1);
        assert!(store.step_dir(1).with_file_name("0001.abandoned-1").is_dir());
    }

    // Tests a pointer that disagrees with the state stops the step
    // Verified by gluing onto the unexpected canvas
    #[test]
    fn test_pointer_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowRight, &config("m"))
                .unwrap();
        tilegrow::session::atomic::write_png(&store.canvas_path(), &coordinate_image(40, 32)).unwrap();
        let generator = MockGenerator::new(small_contract(), MockFill::Noise);
        let result = store.execute_step("x", &generator, &StepOptions::default());
        assert!(matches!(result, Err(GrowError::Consistency { .. })));

        let report = store.recover().unwrap();
        assert!(report.restored_canvas);
        assert!(store
            .execute_step("x", &generator, &StepOptions::default())
            .unwrap()
            .is_committed());
    }

    // Tests a step refuses to build on a current step without its marker
    // Verified by committing step 2 on an unmarked step 1
    #[test]
    fn test_unmarked_current_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowRight, &config("u"))
                .unwrap();
        let generator = MockGenerator::new(small_contract(), MockFill::Noise);
        let first = store
            .execute_step("moor", &generator, &StepOptions::default())
            .unwrap();
        fs::remove_file(first.step_dir.join("committed.ok")).unwrap();

        let mut reopened = SessionStore::open(store.root()).unwrap();
        let result = reopened.execute_step("moor", &generator, &StepOptions::default());
        assert!(matches!(result, Err(GrowError::Consistency { .. })));
        assert!(!reopened.step_dir(2).exists());
        assert_eq!(reopened.step_index(), 1);

        let report = reopened.recover().unwrap();
        assert_eq!(report.rolled_back_step, Some(1));
        assert!(reopened
            .execute_step("moor", &generator, &StepOptions::default())
            .unwrap()
            .is_committed());
        assert_eq!(reopened.step_index(), 1);
    }

    // Tests a canvas with the wrong cross axis is a recorded dimension rejection
    // Verified by escalating every pointer mismatch
    #[test]
    fn test_cross_axis_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SessionStore::create(dir.path(), &coordinate_image(32, 32), GrowthMode::GrowRight, &config("c"))
                .unwrap();
        let state_before = fs::read(store.root().join("session_state.json")).unwrap();
        tilegrow::session::atomic::write_png(&store.canvas_path(), &coordinate_image(32, 30)).unwrap();
        assert_eq!(store.last_rejection().unwrap(), None);

        let generator = MockGenerator::new(small_contract(), MockFill::Noise);
        let result = store
            .execute_step("dune", &generator, &StepOptions::default())
            .unwrap();
        assert_eq!(result.status, StepStatus::Rejected);
        assert_eq!(
            result.rejection.as_ref().map(|r| r.class),
            Some(FailureClass::Dimension)
        );
        assert_eq!(result.canvas_size_before, (32, 30));
        assert_eq!(store.step_index(), 0);
        assert_eq!(fs::read(store.root().join("session_state.json")).unwrap(), state_before);

        let step = StepDirectory::new(&result.step_dir);
        assert!(step.file("prompt.txt").is_file());
        assert!(!step.is_committed());
        let record = store.last_rejection().unwrap().expect("rejection recorded");
        assert_eq!(record.rejection.class, FailureClass::Dimension);
        assert_eq!(record.canvas_size, (32, 30));

        assert!(store.recover().unwrap().restored_canvas);
        assert!(store
            .execute_step("dune", &generator, &StepOptions::default())
            .unwrap()
            .is_committed());
        assert_eq!(store.last_rejection().unwrap(), None);
    }
}
