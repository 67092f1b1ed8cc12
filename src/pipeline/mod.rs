//! Per-step computation from band extraction to the glued canvas

/// Candidate generation, evaluation and selection
pub mod candidates;
/// Prompt normalization and fingerprints
pub mod prompt;
/// In-memory step execution
pub mod step;

pub use candidates::{CandidateEvaluation, CandidatePolicy, select_winner};
pub use step::{Rejection, StepInput, StepOptions, StepOutcome, StepRun, run_step};
