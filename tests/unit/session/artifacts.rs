//! Tests for step directories and their reports

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::solid_image;
    use tilegrow::generator::client::GeneratorErrorKind;
    use tilegrow::geometry::GrowthMode;
    use tilegrow::io::error::FailureClass;
    use tilegrow::pipeline::candidates::{CandidateFailure, CandidateReport};
    use tilegrow::pipeline::step::Rejection;
    use tilegrow::session::artifacts::{
        RejectionRecord, ScoreReport, StepDirectory, candidate_file_name, placement_convention,
    };

    // Tests a directory only counts as committed once the marker exists
    // Verified by treating any artifact as a commit
    #[test]
    fn test_commit_marker() {
        let root = tempfile::tempdir().unwrap();
        let dir = StepDirectory::new(root.path().join("0001"));
        dir.create().unwrap();
        dir.write_png("canvas_after.png", &solid_image(4, 4, [1, 2, 3]))
            .unwrap();
        assert!(!dir.is_committed());
        dir.mark_committed().unwrap();
        assert!(dir.is_committed());
        assert_eq!(fs::read_to_string(dir.file("committed.ok")).unwrap(), "ok\n");
    }

    // Tests rejection records read back with the flattened class and reason
    // Verified by nesting the rejection object
    #[test]
    fn test_rejection_record() {
        let root = tempfile::tempdir().unwrap();
        let dir = StepDirectory::new(root.path().join("0003"));
        assert_eq!(dir.read_rejection().unwrap(), None);

        let record = RejectionRecord {
            step_index: 3,
            mode: GrowthMode::GrowUp,
            rejection: Rejection {
                class: FailureClass::Generator(GeneratorErrorKind::BillingLimit),
                reason: "quota".to_string(),
            },
            canvas_size: (32, 64),
            candidates: vec![CandidateReport {
                index: 0,
                score: None,
                failure: Some(CandidateFailure {
                    class: FailureClass::Generator(GeneratorErrorKind::BillingLimit),
                    detail: "quota".to_string(),
                }),
            }],
        };
        dir.write_rejection(&record).unwrap();

        let text = fs::read_to_string(dir.file("rejected.json")).unwrap();
        assert!(text.contains("\"reason\": \"quota\""));
        assert!(text.contains("\"billing_limit\""));
        assert_eq!(dir.read_rejection().unwrap(), Some(record));
    }

    // Tests the score report lands in scores.json
    // Verified by writing under another name
    #[test]
    fn test_write_scores() {
        let root = tempfile::tempdir().unwrap();
        let dir = StepDirectory::new(root.path().join("0002"));
        let report = ScoreReport {
            step_index: 2,
            mode: GrowthMode::GrowRight,
            prompt_fingerprint: "0123456789abcdef".to_string(),
            generator: "mock".to_string(),
            winner: Some(1),
            candidates: vec![
                CandidateReport {
                    index: 0,
                    score: Some(-2.5),
                    failure: None,
                },
                CandidateReport {
                    index: 1,
                    score: Some(-0.5),
                    failure: None,
                },
            ],
            placement: placement_convention(GrowthMode::GrowRight, 8, 16),
        };
        dir.write_scores(&report).unwrap();
        let text = fs::read_to_string(dir.file("scores.json")).unwrap();
        let parsed: ScoreReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }

    // Tests artifact naming helpers
    // Verified by dropping the zero padding
    #[test]
    fn test_names() {
        assert_eq!(candidate_file_name(3), "candidate_03.png");
        assert_eq!(candidate_file_name(12), "candidate_12.png");
        let placement = placement_convention(GrowthMode::GrowLeft, 256, 512);
        assert!(placement.starts_with("grow-left: conditioning half on the right half side"));
        assert!(placement.contains("256px overlap"));
        assert!(placement.contains("grows by 512px"));
    }
}
