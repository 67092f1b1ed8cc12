//! Placement conventions, band extraction, tile splitting and gluing
//!
//! This module contains the geometric half of the growth protocol:
//! - Growth modes and the overlap/advance contract
//! - Band extraction at the canvas frontier
//! - Tile halves, patch windows and keep-region identity
//! - Gluing and the post-step size invariant

/// Band extraction and canvas shape checks
pub mod band;
/// Overlap/advance contract configuration
pub mod contract;
/// Hard-replace glue and expected canvas size
pub mod glue;
/// Keep-region enforcement and identity checks
pub mod identity;
/// Growth modes, axes and directions
pub mod mode;
/// Axis-agnostic raster helpers
pub mod raster;
/// Tile halves and patch windows
pub mod tile;

pub use contract::GrowthContract;
pub use mode::{Axis, Direction, GrowthMode};
pub use raster::{Band, Canvas, Tile};
