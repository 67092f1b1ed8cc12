//! Final gluing of the winning candidate

/// Feathered glue over the overlap strip
pub mod feather;

pub use feather::glue_with_feather;
