//! Reference/mask packaging for image-conditioned generators

/// Reference canvas and trust mask construction
pub mod reference;
/// Low-frequency scaffold prior
pub mod scaffold;

pub use reference::{MaskClass, ReferenceConfig, ReferenceTile, build_reference};
