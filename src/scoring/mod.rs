//! Seam continuity scoring of candidate tiles

/// Grayscale and Sobel edge maps
pub mod edges;
/// Seam strips, weights and scores
pub mod seam;

pub use seam::score_seam;
