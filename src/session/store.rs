//! Session store: the only component that touches the filesystem
//!
//! Owns the canvas pointer, the session state file and the step directories.
//! A step is durable once its commit marker exists; every file a step writes
//! before the marker is replaced atomically, so a crash leaves either the
//! previous session or the next one on disk, and [`SessionStore::recover`]
//! reconciles whichever it finds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::client::TileGenerator;
use crate::geometry::tile::{patch_window, split_tile};
use crate::geometry::{Canvas, GrowthContract, GrowthMode};
use crate::io::configuration::{
    BAND_FILE, CANVAS_AFTER_FILE, CANVAS_BEFORE_FILE, INITIAL_CANVAS_FILE, MASK_FILE,
    NEW_HALF_FILE, PATCH_FILE, PROMPT_FILE, REFERENCE_FILE, TILE_FILE,
};
use crate::io::error::{GrowError, Result, dimension_error, persistence_error};
use crate::io::image::load_rgb;
use crate::pipeline::candidates::CandidateReport;
use crate::pipeline::prompt::{normalize_prompt, prompt_fingerprint};
use crate::pipeline::step::{Rejection, StepInput, StepOptions, StepOutcome, StepRun, run_step};
use crate::session::artifacts::{
    RejectionRecord, ScoreReport, StepDirectory, candidate_file_name, placement_convention,
};
use crate::session::atomic::write_png;
use crate::session::recovery::{RecoveryReport, archive_step_dir, recover};
use crate::session::state::{SessionLayout, SessionState};

/// Options for creating a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Growth contract, fixed for the life of the session
    pub contract: GrowthContract,
    /// Session identifier; a random UUID when absent
    pub session_id: Option<String>,
    /// File and directory names inside the root
    pub layout: SessionLayout,
}

/// Lifecycle of a store handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created or opened, no step executed through this handle yet
    Created,
    /// A step is running
    StepPending,
    /// The last step committed
    StepCommitted,
    /// The last step was rejected
    StepRejected,
}

/// Final status of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Canvas grew and the step is durable
    Committed,
    /// Canvas and state are unchanged
    Rejected,
}

/// Result of [`SessionStore::execute_step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Commit or rejection
    pub status: StepStatus,
    /// Index of the attempted step
    pub step_index: u64,
    /// Canvas (width, height) before the step
    pub canvas_size_before: (u32, u32),
    /// Canvas (width, height) after the step, equal to before on rejection
    pub canvas_size_after: (u32, u32),
    /// Step artifact directory
    pub step_dir: PathBuf,
    /// Classified reason for a rejection
    pub rejection: Option<Rejection>,
}

impl StepResult {
    /// Whether the step committed
    pub fn is_committed(&self) -> bool {
        self.status == StepStatus::Committed
    }
}

/// Handle on one session directory
///
/// Steps take `&mut self`, so a handle runs at most one step at a time.
#[derive(Debug)]
pub struct SessionStore {
    state: SessionState,
    state_path: PathBuf,
    phase: SessionPhase,
}

impl SessionStore {
    /// Create a session under `artifact_root/<session_id>`
    ///
    /// Writes the canvas pointer, the committed step-0 snapshot and finally
    /// the state file.
    ///
    /// # Errors
    ///
    /// Returns a dimension error unless `initial` is `tile_size` square, an
    /// invalid parameter error for a bad contract, a consistency error if the
    /// session already exists, and persistence errors
    pub fn create(
        artifact_root: &Path,
        initial: &Canvas,
        mode: GrowthMode,
        config: &SessionConfig,
    ) -> Result<Self> {
        let contract = config.contract;
        contract.validate()?;
        let tile = (contract.tile_size, contract.tile_size);
        if initial.dimensions() != tile {
            return Err(dimension_error("initial canvas", tile, initial.dimensions()));
        }

        let session_id = config
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let root = artifact_root.join(&session_id);
        if root.join(&config.layout.state_file).exists() {
            return Err(GrowError::Consistency {
                reason: format!("session '{session_id}' already exists"),
            });
        }
        let steps = root.join(&config.layout.steps_dir);
        fs::create_dir_all(&steps).map_err(persistence_error(&steps, "create session"))?;
        let root = fs::canonicalize(&root).map_err(persistence_error(&root, "resolve root"))?;

        let state = SessionState {
            session_id,
            session_root: root,
            canvas_file: config.layout.canvas_file.clone(),
            steps_dir: config.layout.steps_dir.clone(),
            mode,
            tile_size: contract.tile_size,
            band_size: contract.band_size,
            overlap: contract.overlap,
            advance: contract.advance,
            canvas_width_expected: tile.0,
            canvas_height_expected: tile.1,
            step_index_current: 0,
        };
        let state_path = state.session_root.join(&config.layout.state_file);

        write_png(&state.canvas_path(), initial)?;
        let initial_dir = StepDirectory::new(state.step_dir(0));
        initial_dir.create()?;
        initial_dir.write_png(INITIAL_CANVAS_FILE, initial)?;
        initial_dir.mark_committed()?;
        state.save(&state_path)?;

        tracing::info!(
            session = %state.session_id,
            root = %state.session_root.display(),
            %mode,
            "Created session"
        );
        Ok(Self {
            state,
            state_path,
            phase: SessionPhase::Created,
        })
    }

    /// Open an existing session with the default layout
    ///
    /// # Errors
    ///
    /// See [`SessionStore::open_with_layout`]
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_with_layout(root, &SessionLayout::default())
    }

    /// Open an existing session whose state file is named by `layout`
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the root or state file is missing, a
    /// consistency error if the state was written for a different root or
    /// holds an invalid contract
    pub fn open_with_layout(root: &Path, layout: &SessionLayout) -> Result<Self> {
        if !root.is_dir() {
            return Err(GrowError::NotFound {
                path: root.to_path_buf(),
            });
        }
        let root = fs::canonicalize(root).map_err(persistence_error(root, "resolve root"))?;
        let state_path = root.join(&layout.state_file);
        let state = SessionState::load(&state_path)?;

        let recorded = fs::canonicalize(&state.session_root).map_err(|_err| {
            GrowError::Consistency {
                reason: format!(
                    "recorded session root '{}' does not exist",
                    state.session_root.display()
                ),
            }
        })?;
        if recorded != root {
            return Err(GrowError::Consistency {
                reason: format!(
                    "state belongs to '{}', opened at '{}'",
                    recorded.display(),
                    root.display()
                ),
            });
        }
        state
            .contract()
            .validate()
            .map_err(|err| GrowError::Consistency {
                reason: format!("stored contract is invalid: {err}"),
            })?;

        tracing::debug!(session = %state.session_id, step = state.step_index_current, "Opened session");
        Ok(Self {
            state,
            state_path,
            phase: SessionPhase::Created,
        })
    }

    /// Persisted session metadata as of the last commit
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Absolute session root
    pub fn root(&self) -> &Path {
        &self.state.session_root
    }

    /// Session growth mode
    pub const fn mode(&self) -> GrowthMode {
        self.state.mode
    }

    /// Session growth contract
    pub const fn contract(&self) -> GrowthContract {
        self.state.contract()
    }

    /// Handle lifecycle phase
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Index of the last committed step
    pub const fn step_index(&self) -> u64 {
        self.state.step_index_current
    }

    /// Expected canvas (width, height)
    pub const fn canvas_size(&self) -> (u32, u32) {
        self.state.expected_size()
    }

    /// Artifact directory of step `index`
    pub fn step_dir(&self, index: u64) -> PathBuf {
        self.state.step_dir(index)
    }

    /// Path of the canvas pointer
    pub fn canvas_path(&self) -> PathBuf {
        self.state.canvas_path()
    }

    /// Load the current canvas
    ///
    /// # Errors
    ///
    /// Returns not-found or decode errors
    pub fn load_canvas(&self) -> Result<Canvas> {
        load_rgb(&self.canvas_path())
    }

    /// Rejection record of the latest attempt at the next step, if it failed
    ///
    /// # Errors
    ///
    /// Returns persistence or serialization errors for an unreadable record
    pub fn last_rejection(&self) -> Result<Option<RejectionRecord>> {
        StepDirectory::new(self.state.step_dir(self.state.step_index_current + 1)).read_rejection()
    }

    /// Run one growth step and persist its outcome
    ///
    /// Domain failures produce a [`StepStatus::Rejected`] result with the
    /// canvas and state untouched. Storage failures are returned as errors;
    /// the previous committed state then remains authoritative.
    ///
    /// # Errors
    ///
    /// Returns invalid options, a consistency error if the current step lacks
    /// its commit marker or the canvas pointer disagrees with the state along
    /// the growth axis, and persistence or image errors
    pub fn execute_step<G>(
        &mut self,
        prompt: &str,
        generator: &G,
        options: &StepOptions,
    ) -> Result<StepResult>
    where
        G: TileGenerator + ?Sized,
    {
        options.validate()?;
        self.phase = SessionPhase::StepPending;
        let result = self.run_and_persist(prompt, generator, options);
        self.phase = match &result {
            Ok(step) if step.is_committed() => SessionPhase::StepCommitted,
            Ok(_) => SessionPhase::StepRejected,
            Err(_) => SessionPhase::StepPending,
        };
        result
    }

    /// Reconcile the pointer, state and step directories after a crash
    ///
    /// # Errors
    ///
    /// See [`recover`]
    pub fn recover(&mut self) -> Result<RecoveryReport> {
        let report = recover(&mut self.state, &self.state_path)?;
        if !report.is_clean() {
            tracing::info!(
                session = %self.state.session_id,
                step = self.state.step_index_current,
                archived = report.archived.len(),
                "Recovered session"
            );
        }
        self.phase = SessionPhase::Created;
        Ok(report)
    }

    fn run_and_persist<G>(
        &mut self,
        prompt: &str,
        generator: &G,
        options: &StepOptions,
    ) -> Result<StepResult>
    where
        G: TileGenerator + ?Sized,
    {
        let current = self.state.step_index_current;
        if !StepDirectory::new(self.state.step_dir(current)).is_committed() {
            return Err(GrowError::Consistency {
                reason: format!("step {current} has no commit marker; run recovery"),
            });
        }
        let step_index = current + 1;
        let step_dir = StepDirectory::new(self.state.step_dir(step_index));
        // A previous rejected or crashed attempt at this index
        archive_step_dir(step_dir.path())?;

        // Cross-axis mismatches are left to the step precondition
        let canvas = self.load_canvas()?;
        let axis = self.state.mode.axis();
        let along = axis.along(canvas.dimensions());
        let expected = axis.along(self.state.expected_size());
        if along != expected {
            return Err(GrowError::Consistency {
                reason: format!(
                    "canvas pointer is {}x{}, state expects {}x{}; run recovery",
                    canvas.width(),
                    canvas.height(),
                    self.state.canvas_width_expected,
                    self.state.canvas_height_expected
                ),
            });
        }

        let prompt = normalize_prompt(prompt);
        let mode = self.state.mode;
        let contract = self.state.contract();
        let input = StepInput {
            canvas: &canvas,
            mode,
            contract: &contract,
            prompt: &prompt,
            step_index,
        };
        let run = run_step(&input, generator, options)?;

        step_dir.create()?;
        self.persist_diagnostics(&step_dir, &prompt, generator.name(), &run)?;

        match run.outcome {
            StepOutcome::Rejected(rejection) => {
                step_dir.write_rejection(&RejectionRecord {
                    step_index,
                    mode,
                    rejection: rejection.clone(),
                    canvas_size: canvas.dimensions(),
                    candidates: run.candidates.iter().map(CandidateReport::from).collect(),
                })?;
                tracing::info!(step_index, class = %rejection.class, "Recorded rejected step");
                Ok(StepResult {
                    status: StepStatus::Rejected,
                    step_index,
                    canvas_size_before: canvas.dimensions(),
                    canvas_size_after: canvas.dimensions(),
                    step_dir: step_dir.path().to_path_buf(),
                    rejection: Some(rejection),
                })
            }
            StepOutcome::Committed {
                winner,
                canvas_after,
            } => {
                let tile = run
                    .candidates
                    .get(winner)
                    .and_then(|candidate| candidate.prepared.as_ref())
                    .ok_or_else(|| GrowError::Consistency {
                        reason: format!("winning candidate {winner} has no prepared tile"),
                    })?;
                self.commit(&step_dir, step_index, &canvas, tile, &canvas_after)
            }
        }
    }

    /// Artifacts written for committed and rejected steps alike
    fn persist_diagnostics(
        &self,
        step_dir: &StepDirectory,
        prompt: &str,
        generator: &str,
        run: &StepRun,
    ) -> Result<()> {
        step_dir.write_text(PROMPT_FILE, &format!("{prompt}\n"))?;
        if let Some(band) = &run.band {
            step_dir.write_png(BAND_FILE, band)?;
        }
        if let Some(reference) = &run.reference {
            step_dir.write_png(REFERENCE_FILE, &reference.reference)?;
            step_dir.write_rgba_png(MASK_FILE, &reference.mask_rgba())?;
        }
        for candidate in &run.candidates {
            if let Some(returned) = &candidate.returned {
                step_dir.write_png(&candidate_file_name(candidate.index), returned)?;
            }
        }
        if !run.candidates.is_empty() {
            let contract = self.state.contract();
            step_dir.write_scores(&ScoreReport {
                step_index: self.state.step_index_current + 1,
                mode: self.state.mode,
                prompt_fingerprint: prompt_fingerprint(prompt),
                generator: generator.to_string(),
                winner: run.winner().map(|winner| winner.index),
                candidates: run.candidates.iter().map(CandidateReport::from).collect(),
                placement: placement_convention(self.state.mode, contract.overlap, contract.advance),
            })?;
        }
        Ok(())
    }

    /// Commit protocol: snapshots, canvas pointer, state, then marker
    fn commit(
        &mut self,
        step_dir: &StepDirectory,
        step_index: u64,
        canvas: &Canvas,
        tile: &Canvas,
        canvas_after: &Canvas,
    ) -> Result<StepResult> {
        let mode = self.state.mode;
        let contract = self.state.contract();
        let (_, new_half) = split_tile(tile, mode, &contract)?;
        let patch = patch_window(tile, mode, &contract)?;

        step_dir.write_png(TILE_FILE, tile)?;
        step_dir.write_png(PATCH_FILE, &patch)?;
        step_dir.write_png(NEW_HALF_FILE, &new_half)?;
        step_dir.write_png(CANVAS_BEFORE_FILE, canvas)?;
        step_dir.write_png(CANVAS_AFTER_FILE, canvas_after)?;

        write_png(&self.state.canvas_path(), canvas_after)?;

        let mut next = self.state.clone();
        next.step_index_current = step_index;
        next.set_expected_size(canvas_after.dimensions());
        next.save(&self.state_path)?;
        self.state = next;

        step_dir.mark_committed()?;

        tracing::info!(
            step_index,
            %mode,
            width = canvas_after.width(),
            height = canvas_after.height(),
            "Committed step"
        );
        Ok(StepResult {
            status: StepStatus::Committed,
            step_index,
            canvas_size_before: canvas.dimensions(),
            canvas_size_after: canvas_after.dimensions(),
            step_dir: step_dir.path().to_path_buf(),
            rejection: None,
        })
    }
}
