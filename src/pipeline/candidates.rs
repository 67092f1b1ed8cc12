//! Candidate fan-out, pure evaluation and winner selection
//!
//! Generation is the only part that talks to the outside world. Everything
//! after it is a pure function of the canvas, band and returned tile, so the
//! same inputs always select the same winner regardless of completion order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::generator::client::{GeneratorError, TileGenerator, TileRequest};
use crate::geometry::identity::{check_band_identity, post_enforce_keep};
use crate::geometry::tile::check_tile;
use crate::geometry::{Band, Canvas, GrowthContract, GrowthMode, Tile};
use crate::io::error::{FailureClass, GrowError, Result};
use crate::scoring::score_seam;

/// Why a candidate was discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    /// Failure class of the error that discarded the candidate
    pub class: FailureClass,
    /// Human-readable error message
    pub detail: String,
}

/// Post-processing applied to every returned tile before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePolicy {
    /// Copy the band's keep region into the tile before checking identity
    pub post_enforce_keep: bool,
    /// Discard tiles whose keep region differs from the band
    pub enforce_band_identity: bool,
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self {
            post_enforce_keep: true,
            enforce_band_identity: true,
        }
    }
}

/// Outcome of generating and evaluating one candidate
#[derive(Debug, Clone)]
pub struct CandidateEvaluation {
    /// Candidate index within the step
    pub index: usize,
    /// Tile exactly as the generator returned it
    pub returned: Option<Tile>,
    /// Tile after post-processing, present only for viable candidates
    pub prepared: Option<Tile>,
    /// Seam score; negative infinity for failed candidates
    pub score: f64,
    /// Failure that discarded the candidate
    pub failure: Option<CandidateFailure>,
}

impl CandidateEvaluation {
    /// Whether the candidate can be glued
    pub fn is_viable(&self) -> bool {
        self.failure.is_none() && self.prepared.is_some() && self.score.is_finite()
    }

    fn failed(index: usize, returned: Option<Tile>, class: FailureClass, detail: String) -> Self {
        Self {
            index,
            returned,
            prepared: None,
            score: f64::NEG_INFINITY,
            failure: Some(CandidateFailure { class, detail }),
        }
    }
}

/// Serializable summary of a candidate for score reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    /// Candidate index within the step
    pub index: usize,
    /// Seam score, absent for failed candidates
    pub score: Option<f64>,
    /// Failure that discarded the candidate
    pub failure: Option<CandidateFailure>,
}

impl From<&CandidateEvaluation> for CandidateReport {
    fn from(evaluation: &CandidateEvaluation) -> Self {
        Self {
            index: evaluation.index,
            score: evaluation.score.is_finite().then_some(evaluation.score),
            failure: evaluation.failure.clone(),
        }
    }
}

/// Evaluate one generator outcome against the canvas frontier
///
/// Pure apart from a debug log line. Domain errors mark the candidate failed;
/// any other error is returned.
///
/// # Errors
///
/// Returns errors that have no failure class
pub fn evaluate_candidate(
    index: usize,
    outcome: std::result::Result<Tile, GeneratorError>,
    canvas: &Canvas,
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
    policy: CandidatePolicy,
) -> Result<CandidateEvaluation> {
    let returned = match outcome {
        Ok(tile) => tile,
        Err(err) => {
            tracing::warn!(index, kind = %err.kind, "Candidate generation failed");
            let class = FailureClass::Generator(err.kind);
            return Ok(CandidateEvaluation::failed(index, None, class, err.to_string()));
        }
    };

    match prepare_and_score(&returned, canvas, band, mode, contract, policy) {
        Ok((prepared, score)) => Ok(CandidateEvaluation {
            index,
            returned: Some(returned),
            prepared: Some(prepared),
            score,
            failure: None,
        }),
        Err(err) => match err.failure_class() {
            Some(class) => {
                tracing::warn!(index, %class, "Candidate discarded");
                Ok(CandidateEvaluation::failed(index, Some(returned), class, err.to_string()))
            }
            None => Err(err),
        },
    }
}

fn prepare_and_score(
    returned: &Tile,
    canvas: &Canvas,
    band: &Band,
    mode: GrowthMode,
    contract: &GrowthContract,
    policy: CandidatePolicy,
) -> Result<(Tile, f64)> {
    check_tile(returned, contract)?;
    let mut prepared = returned.clone();
    if policy.post_enforce_keep {
        post_enforce_keep(&mut prepared, band, mode, contract)?;
    }
    if policy.enforce_band_identity {
        check_band_identity(&prepared, band, mode, contract)?;
    }
    let score = score_seam(canvas, &prepared, mode, contract)?;
    if !score.is_finite() {
        return Err(GrowError::Consistency {
            reason: format!("non-finite seam score {score}"),
        });
    }
    Ok((prepared, score))
}

/// Shared inputs for one round of candidate generation
#[derive(Debug, Clone, Copy)]
pub struct CandidateRound<'a> {
    /// Canvas before the step
    pub canvas: &'a Canvas,
    /// Request template; `candidate_index` is overwritten per candidate
    pub request: TileRequest<'a>,
    /// Growth contract of the session
    pub contract: &'a GrowthContract,
    /// Post-processing policy
    pub policy: CandidatePolicy,
}

/// Generate and evaluate `count` candidates, in index order
///
/// With `parallel` the candidates are generated on the rayon pool. Results are
/// collected by index, so the output never depends on completion order.
///
/// # Errors
///
/// Returns the first error without a failure class
pub fn run_candidates<G>(
    generator: &G,
    round: &CandidateRound<'_>,
    count: usize,
    parallel: bool,
) -> Result<Vec<CandidateEvaluation>>
where
    G: TileGenerator + ?Sized,
{
    let evaluate = |index: usize| {
        let request = TileRequest {
            candidate_index: index,
            ..round.request
        };
        let outcome = generator.generate_tile(&request);
        evaluate_candidate(
            index,
            outcome,
            round.canvas,
            round.request.band,
            round.request.mode,
            round.contract,
            round.policy,
        )
    };

    if parallel && count > 1 {
        (0..count).into_par_iter().map(evaluate).collect()
    } else {
        (0..count).map(evaluate).collect()
    }
}

/// Index of the highest-scoring viable candidate, lowest index on ties
pub fn select_winner(evaluations: &[CandidateEvaluation]) -> Option<usize> {
    evaluations
        .iter()
        .filter(|evaluation| evaluation.is_viable())
        .fold(None, |best: Option<&CandidateEvaluation>, evaluation| match best {
            Some(current)
                if current.score > evaluation.score
                    || (current.score >= evaluation.score && current.index < evaluation.index) =>
            {
                Some(current)
            }
            _ => Some(evaluation),
        })
        .map(|winner| winner.index)
}
