//! Durable session storage, commit protocol and crash recovery

/// Per-step artifact directories and reports
pub mod artifacts;
/// Temp-file, fsync and rename writes
pub mod atomic;
/// Startup reconciliation after a crash
pub mod recovery;
/// Persisted session metadata
pub mod state;
/// Session lifecycle and step execution
pub mod store;

pub use recovery::RecoveryReport;
pub use state::{SessionLayout, SessionState};
pub use store::{SessionConfig, SessionPhase, SessionStore, StepResult, StepStatus};
