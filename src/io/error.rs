//! Error types and failure classification for growth operations

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::generator::client::{GeneratorError, GeneratorErrorKind};

/// Main error type for all growth operations
#[derive(Debug)]
pub enum GrowError {
    /// A canvas, band or tile shape violates a hard invariant
    Dimension {
        /// What was being checked (e.g. "tile", "band", "canvas cross axis")
        subject: &'static str,
        /// Expected (width, height)
        expected: (u32, u32),
        /// Observed (width, height)
        actual: (u32, u32),
    },

    /// The conditioning half does not reproduce the band inside the keep region
    BandIdentity {
        /// Number of pixels that differ inside the keep region
        mismatched_pixels: usize,
        /// Total pixels compared
        compared_pixels: usize,
    },

    /// The external generator failed for one candidate
    Generator(GeneratorError),

    /// Atomic write, rename, fsync or directory creation failed
    Persistence {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A session or one of its authoritative files does not exist
    NotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// Persisted state disagrees with itself or with the caller
    Consistency {
        /// Description of the disagreement
        reason: String,
    },

    /// Failed to decode an image from disk
    ImageDecode {
        /// Path to the image file
        path: PathBuf,
        /// Underlying decoder error
        source: image::ImageError,
    },

    /// Failed to encode an image for persistence
    ImageEncode {
        /// Artifact being encoded
        artifact: String,
        /// Underlying encoder error
        source: image::ImageError,
    },

    /// Failed to serialize or deserialize persisted metadata
    Serialization {
        /// Path of the document
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// Configuration parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },
}

/// Domain failure classes that reject a step instead of escalating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Shape violation of a canvas, band or tile
    Dimension,
    /// Keep region of the conditioning half does not match the band
    BandIdentity,
    /// Generator collaborator failure of the given kind
    Generator(GeneratorErrorKind),
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension => write!(f, "dimension"),
            Self::BandIdentity => write!(f, "band_identity"),
            Self::Generator(kind) => write!(f, "generator:{kind}"),
        }
    }
}

impl GrowError {
    /// Classify domain errors; storage and configuration errors return `None`
    /// and must be propagated to the caller
    pub const fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Self::Dimension { .. } => Some(FailureClass::Dimension),
            Self::BandIdentity { .. } => Some(FailureClass::BandIdentity),
            Self::Generator(err) => Some(FailureClass::Generator(err.kind)),
            _ => None,
        }
    }
}

impl fmt::Display for GrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension {
                subject,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Dimension error: {subject} must be {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            Self::BandIdentity {
                mismatched_pixels,
                compared_pixels,
            } => {
                write!(
                    f,
                    "Band identity violation: {mismatched_pixels} of {compared_pixels} keep-region pixels differ"
                )
            }
            Self::Generator(err) => write!(f, "Generator error: {err}"),
            Self::Persistence {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "Persistence error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::NotFound { path } => write!(f, "Not found: '{}'", path.display()),
            Self::Consistency { reason } => write!(f, "Consistency error: {reason}"),
            Self::ImageDecode { path, source } => {
                write!(f, "Failed to decode image '{}': {source}", path.display())
            }
            Self::ImageEncode { artifact, source } => {
                write!(f, "Failed to encode image '{artifact}': {source}")
            }
            Self::Serialization { path, source } => {
                write!(
                    f,
                    "Failed to (de)serialize '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for GrowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Generator(err) => Some(err),
            Self::Persistence { source, .. } => Some(source),
            Self::ImageDecode { source, .. } | Self::ImageEncode { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for growth results
pub type Result<T> = std::result::Result<T, GrowError>;

impl From<GeneratorError> for GrowError {
    fn from(err: GeneratorError) -> Self {
        Self::Generator(err)
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GrowError {
    GrowError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a dimension error for `subject`
pub const fn dimension_error(
    subject: &'static str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> GrowError {
    GrowError::Dimension {
        subject,
        expected,
        actual,
    }
}

/// Wrap an I/O error with the path and operation it belongs to
pub fn persistence_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> GrowError {
    let path = path.into();
    move |source| GrowError::Persistence {
        path,
        operation,
        source,
    }
}
