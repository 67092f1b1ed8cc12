//! Contract consumed from the external tile generator

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conditioning::reference::ReferenceTile;
use crate::geometry::{Band, GrowthMode, Tile};

/// Failure categories reported by a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorErrorKind {
    /// Network glitch, rate limit or timeout; the same request may succeed later
    Transient,
    /// Bad request, bad credentials or unsupported model
    Permanent,
    /// The model refused the prompt
    SafetyRefusal,
    /// The account is blocked at a billing limit
    BillingLimit,
}

impl GeneratorErrorKind {
    /// Whether repeating the same request is worthwhile
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }

    /// Stable snake-case name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::SafetyRefusal => "safety_refusal",
            Self::BillingLimit => "billing_limit",
        }
    }
}

impl fmt::Display for GeneratorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a generator for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorError {
    /// Failure category
    pub kind: GeneratorErrorKind,
    /// Collaborator-provided detail
    pub message: String,
}

impl GeneratorError {
    /// Create an error of the given kind
    pub fn new(kind: GeneratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Retryable failure
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Transient, message)
    }

    /// Non-retryable failure
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Permanent, message)
    }

    /// A call that exceeded its deadline; surfaces as transient
    pub fn timeout(elapsed: std::time::Duration) -> Self {
        Self::transient(format!("timed out after {}ms", elapsed.as_millis()))
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for GeneratorError {}

/// Everything a generator is told about one candidate
#[derive(Debug, Clone, Copy)]
pub struct TileRequest<'a> {
    /// Conditioning band cut from the frontier
    pub band: &'a Band,
    /// Growth mode of the session
    pub mode: GrowthMode,
    /// Prompt text for the new half
    pub prompt: &'a str,
    /// Step index being attempted
    pub step_index: u64,
    /// Candidate number within the step, starting at 0
    pub candidate_index: usize,
    /// Reference and mask for image-conditioned generators
    pub reference: Option<&'a ReferenceTile>,
}

/// Produces full tiles whose conditioning half reflects the band
///
/// Implementations are called from worker threads when candidates are
/// generated in parallel, and must not rely on call order.
pub trait TileGenerator: Send + Sync {
    /// Generate one `tile_size` square tile for `request`
    ///
    /// # Errors
    ///
    /// Returns a generator error classified by kind
    fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "generator"
    }
}

impl<G: TileGenerator + ?Sized> TileGenerator for &G {
    fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError> {
        (**self).generate_tile(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<G: TileGenerator + ?Sized> TileGenerator for Box<G> {
    fn generate_tile(&self, request: &TileRequest<'_>) -> Result<Tile, GeneratorError> {
        (**self).generate_tile(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
