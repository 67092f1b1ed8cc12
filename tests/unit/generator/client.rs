//! Tests for the generator contract types

#[cfg(test)]
mod tests {
    use crate::{coordinate_image, small_contract};
    use std::time::Duration;
    use tilegrow::generator::client::{
        GeneratorError, GeneratorErrorKind, TileGenerator, TileRequest,
    };
    use tilegrow::generator::mock::{MockFill, MockGenerator};
    use tilegrow::geometry::GrowthMode;

    // Tests only transient failures are retryable
    // Verified by marking billing limits retryable
    #[test]
    fn test_retryable_kinds() {
        assert!(GeneratorErrorKind::Transient.is_retryable());
        assert!(!GeneratorErrorKind::Permanent.is_retryable());
        assert!(!GeneratorErrorKind::SafetyRefusal.is_retryable());
        assert!(!GeneratorErrorKind::BillingLimit.is_retryable());
    }

    // Tests timeouts surface as transient errors with the elapsed time
    // Verified by classifying timeouts as permanent
    #[test]
    fn test_timeout_is_transient() {
        let err = GeneratorError::timeout(Duration::from_millis(1500));
        assert_eq!(err.kind, GeneratorErrorKind::Transient);
        assert!(err.to_string().contains("1500ms"));
        assert!(err.to_string().contains("transient"));
    }

    // Tests kinds serialize to stable snake-case names
    // Verified by removing the serde rename
    #[test]
    fn test_kind_names() {
        assert_eq!(GeneratorErrorKind::SafetyRefusal.as_str(), "safety_refusal");
        let json = serde_json::to_string(&GeneratorErrorKind::BillingLimit).unwrap_or_default();
        assert_eq!(json, "\"billing_limit\"");
    }

    fn name_of<G: TileGenerator>(generator: G) -> String {
        generator.name().to_string()
    }

    // Tests references and boxes forward to the wrapped generator
    // Verified by returning the default name from the blanket impls
    #[test]
    fn test_blanket_impls() {
        let contract = small_contract();
        let mock = MockGenerator::new(contract, MockFill::Mirror);
        let boxed: Box<dyn TileGenerator> = Box::new(mock.clone());
        let band = coordinate_image(16, 32);
        let request = TileRequest {
            band: &band,
            mode: GrowthMode::GrowRight,
            prompt: "sea",
            step_index: 1,
            candidate_index: 0,
            reference: None,
        };

        assert_eq!(name_of(&mock), "mock");
        assert_eq!(boxed.name(), "mock");
        let direct = mock.generate_tile(&request).expect("tile");
        let via_box = boxed.generate_tile(&request).expect("tile");
        assert_eq!(direct, via_box);
    }
}
