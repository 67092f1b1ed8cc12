//! Mathematical utilities for blending, weighting and fingerprinting

/// Stable FNV-1a fingerprints
pub mod hash;
/// Linear ramps and channel compositing
pub mod ramp;
