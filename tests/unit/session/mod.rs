pub mod artifacts;
pub mod store;
