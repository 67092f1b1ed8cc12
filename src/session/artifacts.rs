//! Per-step artifact directory
//!
//! Images and reports land here during a step. Only the commit marker, written
//! last, makes the directory count as committed.

use std::path::{Path, PathBuf};

use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geometry::GrowthMode;
use crate::io::configuration::{COMMIT_MARKER, REJECTION_FILE, SCORES_FILE};
use crate::io::error::{GrowError, Result, persistence_error};
use crate::pipeline::candidates::CandidateReport;
use crate::pipeline::step::Rejection;
use crate::session::atomic::{write_json, write_png, write_rgba_png, write_text};

/// Score report written for every step that ran candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Step index
    pub step_index: u64,
    /// Session growth mode
    pub mode: GrowthMode,
    /// Fingerprint of the normalized prompt
    pub prompt_fingerprint: String,
    /// Generator name
    pub generator: String,
    /// Winning candidate, absent for rejected steps
    pub winner: Option<usize>,
    /// Every candidate in index order
    pub candidates: Vec<CandidateReport>,
    /// How the winner is placed on the canvas
    pub placement: String,
}

/// Diagnostic record of a rejected step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionRecord {
    /// Index the step would have had
    pub step_index: u64,
    /// Session growth mode
    pub mode: GrowthMode,
    /// Classified reason
    #[serde(flatten)]
    pub rejection: Rejection,
    /// Canvas (width, height), unchanged by the rejection
    pub canvas_size: (u32, u32),
    /// Candidate outcomes, empty if the step failed before generation
    pub candidates: Vec<CandidateReport>,
}

/// Handle on `steps/NNNN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDirectory {
    path: PathBuf,
}

impl StepDirectory {
    /// Wrap an existing or future step directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of artifact `name`
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Create the directory
    ///
    /// # Errors
    ///
    /// Returns a persistence error if creation fails
    pub fn create(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)
            .map_err(persistence_error(&self.path, "create step directory"))
    }

    /// Whether the commit marker exists
    pub fn is_committed(&self) -> bool {
        self.file(COMMIT_MARKER).is_file()
    }

    /// Durably write an RGB artifact
    ///
    /// # Errors
    ///
    /// Returns encode or persistence errors
    pub fn write_png(&self, name: &str, image: &RgbImage) -> Result<()> {
        write_png(&self.file(name), image)
    }

    /// Durably write an RGBA artifact
    ///
    /// # Errors
    ///
    /// Returns encode or persistence errors
    pub fn write_rgba_png(&self, name: &str, image: &RgbaImage) -> Result<()> {
        write_rgba_png(&self.file(name), image)
    }

    /// Durably write a text artifact
    ///
    /// # Errors
    ///
    /// Returns persistence errors
    pub fn write_text(&self, name: &str, text: &str) -> Result<()> {
        write_text(&self.file(name), text)
    }

    /// Durably write the score report
    ///
    /// # Errors
    ///
    /// Returns serialization or persistence errors
    pub fn write_scores(&self, report: &ScoreReport) -> Result<()> {
        write_json(&self.file(SCORES_FILE), report)
    }

    /// Durably write the rejection record
    ///
    /// # Errors
    ///
    /// Returns serialization or persistence errors
    pub fn write_rejection(&self, record: &RejectionRecord) -> Result<()> {
        write_json(&self.file(REJECTION_FILE), record)
    }

    /// Read back the rejection record, if any
    ///
    /// # Errors
    ///
    /// Returns persistence or serialization errors for an unreadable record
    pub fn read_rejection(&self) -> Result<Option<RejectionRecord>> {
        let path = self.file(REJECTION_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text =
            std::fs::read_to_string(&path).map_err(persistence_error(&path, "read rejection"))?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| GrowError::Serialization { path, source })
    }

    /// Durably write the commit marker; must be the last write of a step
    ///
    /// # Errors
    ///
    /// Returns persistence errors
    pub fn mark_committed(&self) -> Result<()> {
        write_text(&self.file(COMMIT_MARKER), "ok\n")
    }
}

/// File name for the raw output of candidate `index`
pub fn candidate_file_name(index: usize) -> String {
    format!("candidate_{index:02}.png")
}

/// Human-readable placement convention for `mode`
pub fn placement_convention(mode: GrowthMode, overlap: u32, advance: u32) -> String {
    format!(
        "{mode}: conditioning half on the {} side, new half on the {} side; \
         {overlap}px overlap pasted over the frontier, canvas grows by {advance}px",
        mode.conditioning_side(),
        mode.new_side()
    )
}
