//! Retry policy for transient generator failures

use std::time::Duration;

use crate::generator::client::{GeneratorError, TileGenerator, TileRequest};
use crate::geometry::Tile;

/// Decorator that repeats a request while the inner generator reports
/// transient failures
///
/// Permanent, safety and billing failures are returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryingGenerator<G> {
    inner: G,
    max_attempts: usize,
    backoff: Duration,
}

impl<G: TileGenerator> RetryingGenerator<G> {
    /// Wrap `inner`, allowing up to `max_attempts` calls per request
    ///
    /// The wait before attempt `n + 1` is `n * backoff`. A `max_attempts` of
    /// zero is treated as one.
    pub fn new(inner: G, max_attempts: usize, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// The wrapped generator
    pub const fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: TileGenerator> TileGenerator for RetryingGenerator<G> {
    fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError> {
        let mut attempt = 1;
        loop {
            match self.inner.generate_tile(request) {
                Ok(tile) => return Ok(tile),
                Err(err) if err.kind.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        generator = self.inner.name(),
                        candidate = request.candidate_index,
                        attempt,
                        error = %err,
                        "Transient generator failure, retrying"
                    );
                    let wait = self.backoff.saturating_mul(attempt as u32);
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
