//! Directional canvas growth by seam-scored tile stitching
//!
//! A session starts from one square tile and grows in a single direction. Each
//! step cuts a conditioning band from the frontier, asks a generator for
//! candidate tiles whose conditioning half continues the band, scores every
//! candidate for seam continuity, and glues the winner onto the canvas. The
//! session store commits each step atomically so a crash never leaves a
//! half-grown canvas.

#![deny(unsafe_code)]

/// Reference tiles and masks for image-conditioned generators
pub mod conditioning;
/// Generator trait, offline mock and retry wrapper
pub mod generator;
/// Growth modes, contracts, bands, tiles and gluing
pub mod geometry;
/// Input/output operations, configuration and error handling
pub mod io;
/// Ramps, blending and fingerprints
pub mod math;
/// Per-step candidate evaluation and selection
pub mod pipeline;
/// Seam continuity scoring
pub mod scoring;
/// Durable session storage and recovery
pub mod session;
/// Feathered gluing
pub mod stitch;

pub use io::error::{GrowError, Result};
