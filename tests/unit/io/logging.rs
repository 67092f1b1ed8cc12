//! Tests for logging setup

#[cfg(test)]
mod tests {
    use tilegrow::io::logging::{env_filter, init_logging};

    // Tests quiet mode limits output to warnings
    // Verified by ignoring the quiet flag
    #[test]
    fn test_quiet_filter() {
        assert_eq!(env_filter(true).to_string(), "warn");
    }

    // Tests a second install reports the existing subscriber
    // Verified by panicking on the second install
    #[test]
    fn test_init_once() {
        init_logging(true);
        assert!(!init_logging(true));
    }
}
