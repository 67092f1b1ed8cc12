//! One growth step computed entirely in memory
//!
//! [`run_step`] turns a canvas, a prompt and a generator into either a glued
//! canvas or a classified rejection. It never touches the filesystem; the
//! session store persists whatever it returns.

use serde::{Deserialize, Serialize};

use crate::conditioning::{ReferenceConfig, ReferenceTile, build_reference};
use crate::generator::client::{TileGenerator, TileRequest};
use crate::geometry::band::{check_canvas, extract_band};
use crate::geometry::glue::expected_next_size;
use crate::geometry::{Band, Canvas, GrowthContract, GrowthMode};
use crate::io::configuration::{DEFAULT_CANDIDATES, DEFAULT_FEATHER, MAX_CANDIDATES};
use crate::io::error::{FailureClass, GrowError, Result, dimension_error, invalid_parameter};
use crate::pipeline::candidates::{
    CandidateEvaluation, CandidatePolicy, CandidateRound, run_candidates, select_winner,
};
use crate::stitch::glue_with_feather;

/// Caller-selected options for a single step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOptions {
    /// Number of candidates to request, 1 to [`MAX_CANDIDATES`]
    pub candidate_count: usize,
    /// Feather width in pixels, 0 for a hard seam
    pub feather_px: u32,
    /// Discard candidates whose keep region differs from the band
    pub enforce_band_identity: bool,
    /// Copy the band's keep region into each tile before checking identity
    pub post_enforce_keep: bool,
    /// Generate candidates on the rayon pool
    pub parallel: bool,
    /// Build and pass a reference tile and mask to the generator
    pub reference: Option<ReferenceConfig>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            candidate_count: DEFAULT_CANDIDATES,
            feather_px: DEFAULT_FEATHER,
            enforce_band_identity: true,
            post_enforce_keep: true,
            parallel: false,
            reference: None,
        }
    }
}

impl StepOptions {
    /// Check option ranges
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error for a candidate count outside
    /// `1..=MAX_CANDIDATES`
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CANDIDATES).contains(&self.candidate_count) {
            return Err(invalid_parameter(
                "candidate_count",
                &self.candidate_count,
                &format!("must be between 1 and {MAX_CANDIDATES}"),
            ));
        }
        Ok(())
    }

    /// Candidate post-processing derived from these options
    pub const fn policy(&self) -> CandidatePolicy {
        CandidatePolicy {
            post_enforce_keep: self.post_enforce_keep,
            enforce_band_identity: self.enforce_band_identity,
        }
    }
}

/// Classified reason a step did not commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Failure class
    pub class: FailureClass,
    /// Human-readable reason
    pub reason: String,
}

impl Rejection {
    /// Rejection for a domain error, `None` for errors that must escalate
    pub fn from_error(err: &GrowError) -> Option<Self> {
        err.failure_class().map(|class| Self {
            class,
            reason: err.to_string(),
        })
    }
}

/// Inputs of one step
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    /// Current canvas
    pub canvas: &'a Canvas,
    /// Session growth mode
    pub mode: GrowthMode,
    /// Session growth contract
    pub contract: &'a GrowthContract,
    /// Normalized prompt
    pub prompt: &'a str,
    /// Index the step will have if it commits
    pub step_index: u64,
}

/// Whether the step produced a new canvas
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The winner was glued
    Committed {
        /// Index of the winning candidate
        winner: usize,
        /// Canvas after gluing
        canvas_after: Canvas,
    },
    /// Nothing may be written to the canvas
    Rejected(Rejection),
}

/// Everything a step computed, for persistence and diagnostics
#[derive(Debug, Clone)]
pub struct StepRun {
    /// Conditioning band, absent when the canvas failed its precondition
    pub band: Option<Band>,
    /// Reference tile passed to the generator
    pub reference: Option<ReferenceTile>,
    /// Every candidate in index order
    pub candidates: Vec<CandidateEvaluation>,
    /// Commit or rejection
    pub outcome: StepOutcome,
}

impl StepRun {
    fn rejected(band: Option<Band>, reference: Option<ReferenceTile>, rejection: Rejection) -> Self {
        Self {
            band,
            reference,
            candidates: Vec::new(),
            outcome: StepOutcome::Rejected(rejection),
        }
    }

    /// Winning candidate, if the step committed
    pub fn winner(&self) -> Option<&CandidateEvaluation> {
        match self.outcome {
            StepOutcome::Committed { winner, .. } => self.candidates.get(winner),
            StepOutcome::Rejected(_) => None,
        }
    }

    /// Rejection, if the step did not commit
    pub const fn rejection(&self) -> Option<&Rejection> {
        match &self.outcome {
            StepOutcome::Rejected(rejection) => Some(rejection),
            StepOutcome::Committed { .. } => None,
        }
    }
}

/// Map a domain error to `Err(Rejection)` and escalate the rest
fn classify<T>(result: Result<T>) -> Result<std::result::Result<T, Rejection>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(err) => Rejection::from_error(&err).map(Err).ok_or(err),
    }
}

/// Run one step in memory
///
/// Domain failures (dimension, band identity, generator) come back as a
/// rejected [`StepRun`]. The canvas argument is never modified.
///
/// # Errors
///
/// Returns invalid options and errors without a failure class
pub fn run_step<G>(input: &StepInput<'_>, generator: &G, options: &StepOptions) -> Result<StepRun>
where
    G: TileGenerator + ?Sized,
{
    options.validate()?;
    let StepInput {
        canvas,
        mode,
        contract,
        prompt,
        step_index,
    } = *input;

    if let Err(rejection) = classify(check_canvas(canvas, mode, contract))? {
        return Ok(StepRun::rejected(None, None, rejection));
    }
    let band = match classify(extract_band(canvas, mode, contract))? {
        Ok(band) => band,
        Err(rejection) => return Ok(StepRun::rejected(None, None, rejection)),
    };
    let reference = match &options.reference {
        Some(config) => match classify(build_reference(&band, mode, contract, config))? {
            Ok(reference) => Some(reference),
            Err(rejection) => return Ok(StepRun::rejected(Some(band), None, rejection)),
        },
        None => None,
    };

    let round = CandidateRound {
        canvas,
        request: TileRequest {
            band: &band,
            mode,
            prompt,
            step_index,
            candidate_index: 0,
            reference: reference.as_ref(),
        },
        contract,
        policy: options.policy(),
    };
    let candidates = run_candidates(generator, &round, options.candidate_count, options.parallel)?;

    let outcome = match select_winner(&candidates) {
        Some(winner) => glue_winner(canvas, &candidates, winner, mode, contract, options)?,
        None => StepOutcome::Rejected(no_viable_candidate(&candidates)),
    };

    match &outcome {
        StepOutcome::Committed { winner, .. } => {
            tracing::info!(step_index, %mode, winner, generator = generator.name(), "Selected winning candidate");
        }
        StepOutcome::Rejected(rejection) => {
            tracing::warn!(step_index, %mode, class = %rejection.class, "Step rejected");
        }
    }

    Ok(StepRun {
        band: Some(band),
        reference,
        candidates,
        outcome,
    })
}

fn glue_winner(
    canvas: &Canvas,
    candidates: &[CandidateEvaluation],
    winner: usize,
    mode: GrowthMode,
    contract: &GrowthContract,
    options: &StepOptions,
) -> Result<StepOutcome> {
    let Some(tile) = candidates.get(winner).and_then(|c| c.prepared.as_ref()) else {
        return Err(GrowError::Consistency {
            reason: format!("winning candidate {winner} has no prepared tile"),
        });
    };

    let glued = match classify(glue_with_feather(canvas, tile, mode, contract, options.feather_px))? {
        Ok(glued) => glued,
        Err(rejection) => return Ok(StepOutcome::Rejected(rejection)),
    };

    let expected = expected_next_size(canvas.dimensions(), mode, contract.advance);
    if glued.dimensions() != expected {
        let err = dimension_error("canvas after glue", expected, glued.dimensions());
        return Ok(StepOutcome::Rejected(Rejection {
            class: FailureClass::Dimension,
            reason: err.to_string(),
        }));
    }

    Ok(StepOutcome::Committed {
        winner,
        canvas_after: glued,
    })
}

/// Rejection summarizing why every candidate failed
fn no_viable_candidate(candidates: &[CandidateEvaluation]) -> Rejection {
    let first = candidates.iter().find_map(|c| c.failure.as_ref());
    let class = first.map_or(FailureClass::Dimension, |failure| failure.class);
    let details = candidates
        .iter()
        .filter_map(|c| c.failure.as_ref().map(|f| format!("#{}: {}", c.index, f.detail)))
        .collect::<Vec<_>>()
        .join("; ");
    Rejection {
        class,
        reason: format!("no viable candidate ({details})"),
    }
}
