//! External generator contract and bundled implementations

/// Generator trait, requests and error kinds
pub mod client;
/// Deterministic offline generator
pub mod mock;
/// Retry decorator for transient failures
pub mod retry;

pub use client::{GeneratorError, GeneratorErrorKind, TileGenerator, TileRequest};
pub use mock::{MockFill, MockGenerator};
pub use retry::RetryingGenerator;
