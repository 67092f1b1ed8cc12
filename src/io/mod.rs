/// Command-line interface and command runner
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error types and failure classes
pub mod error;
/// PNG loading and encoding
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Step progress display
pub mod progress;
