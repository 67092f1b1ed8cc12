//! Startup reconciliation of a session after a crash
//!
//! A step directory without its commit marker never happened. Recovery
//! rolls the session back to the last committed step, restores the canvas
//! pointer from that step's snapshot when it disagrees with the state, and
//! archives every uncommitted step directory so a retry starts clean.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::configuration::{
    ABANDONED_SUFFIX, CANVAS_AFTER_FILE, CANVAS_BEFORE_FILE, INITIAL_CANVAS_FILE,
    MAX_ABANDONED_ATTEMPTS,
};
use crate::io::error::{GrowError, Result, persistence_error};
use crate::io::image::{image_dimensions, load_rgb};
use crate::session::artifacts::StepDirectory;
use crate::session::atomic::write_png;
use crate::session::state::{SessionState, parse_step_dir_name};

/// A numbered directory under `steps/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Step index parsed from the directory name
    pub index: u64,
    /// Directory path
    pub path: PathBuf,
    /// Whether the commit marker is present
    pub committed: bool,
}

/// What [`recover`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Step whose half-finished commit was undone
    pub rolled_back_step: Option<u64>,
    /// Whether the canvas pointer was rewritten from a snapshot
    pub restored_canvas: bool,
    /// Uncommitted step directories moved aside
    pub archived: Vec<PathBuf>,
}

impl RecoveryReport {
    /// Whether recovery found nothing to repair
    pub const fn is_clean(&self) -> bool {
        self.rolled_back_step.is_none() && !self.restored_canvas && self.archived.is_empty()
    }
}

/// List numbered step directories in index order
///
/// Archived attempts and stray files are skipped.
///
/// # Errors
///
/// Returns a persistence error if the directory cannot be read
pub fn scan_steps(steps_root: &Path) -> Result<Vec<StepRecord>> {
    if !steps_root.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(steps_root).map_err(persistence_error(steps_root, "list steps"))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(persistence_error(steps_root, "list steps"))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(index) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_step_dir_name)
        else {
            continue;
        };
        let committed = StepDirectory::new(&path).is_committed();
        records.push(StepRecord {
            index,
            path,
            committed,
        });
    }
    records.sort_by_key(|record| record.index);
    Ok(records)
}

/// Archived `NNNN.abandoned-K` siblings of `step_dir`, oldest first
///
/// # Errors
///
/// Returns a persistence error if the parent directory cannot be read
pub fn abandoned_attempts(step_dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let Some(parent) = step_dir.parent().filter(|parent| parent.is_dir()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}.{ABANDONED_SUFFIX}-", step_dir_name(step_dir));
    let entries = fs::read_dir(parent).map_err(persistence_error(parent, "list attempts"))?;

    let mut attempts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(persistence_error(parent, "list attempts"))?;
        let name = entry.file_name();
        let Some(attempt) = name
            .to_str()
            .and_then(|name| name.strip_prefix(&prefix))
            .and_then(|suffix| suffix.parse::<u32>().ok())
        else {
            continue;
        };
        attempts.push((attempt, entry.path()));
    }
    attempts.sort_by_key(|(attempt, _)| *attempt);
    Ok(attempts)
}

/// Next `NNNN.abandoned-K` sibling of `step_dir`, numbered after the newest
///
/// # Errors
///
/// See [`abandoned_attempts`]
pub fn abandoned_path(step_dir: &Path) -> Result<PathBuf> {
    let next = abandoned_attempts(step_dir)?
        .last()
        .map_or(1, |(attempt, _)| attempt.saturating_add(1));
    let name = step_dir_name(step_dir);
    Ok(step_dir.with_file_name(format!("{name}.{ABANDONED_SUFFIX}-{next}")))
}

/// Delete all but the newest `keep` archived attempts of `step_dir`
///
/// Returns the deleted paths.
///
/// # Errors
///
/// Returns a persistence error if listing or deleting fails
pub fn prune_abandoned(step_dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let attempts = abandoned_attempts(step_dir)?;
    let excess = attempts.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for (_, path) in attempts.into_iter().take(excess) {
        fs::remove_dir_all(&path).map_err(persistence_error(&path, "prune attempt"))?;
        removed.push(path);
    }
    if !removed.is_empty() {
        tracing::debug!(step = %step_dir.display(), removed = removed.len(), "Pruned archived attempts");
    }
    Ok(removed)
}

fn step_dir_name(step_dir: &Path) -> String {
    step_dir
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Move an uncommitted step directory aside
///
/// Returns the archive path, or `None` if there was nothing to move. At most
/// [`MAX_ABANDONED_ATTEMPTS`] archives are kept per index.
///
/// # Errors
///
/// Returns a consistency error for a committed directory, or a persistence
/// error if the rename or pruning fails
pub fn archive_step_dir(step_dir: &Path) -> Result<Option<PathBuf>> {
    if !step_dir.exists() {
        return Ok(None);
    }
    if StepDirectory::new(step_dir).is_committed() {
        return Err(GrowError::Consistency {
            reason: format!(
                "refusing to archive committed step directory '{}'",
                step_dir.display()
            ),
        });
    }
    let target = abandoned_path(step_dir)?;
    fs::rename(step_dir, &target).map_err(persistence_error(step_dir, "archive step"))?;
    tracing::info!(from = %step_dir.display(), to = %target.display(), "Archived uncommitted step");
    prune_abandoned(step_dir, MAX_ABANDONED_ATTEMPTS)?;
    Ok(Some(target))
}

/// Snapshot holding the canvas after the last committed step
fn committed_snapshot(state: &SessionState) -> PathBuf {
    let index = state.step_index_current;
    let dir = StepDirectory::new(state.step_dir(index));
    if index == 0 {
        dir.file(INITIAL_CANVAS_FILE)
    } else {
        dir.file(CANVAS_AFTER_FILE)
    }
}

/// Bring the canvas pointer, state file and step directories back into
/// agreement
///
/// `state` is updated in memory and on disk at `state_path` when rolled back.
///
/// # Errors
///
/// Returns a consistency error when no committed snapshot can explain the
/// files on disk, and persistence or image errors from the repairs
pub fn recover(state: &mut SessionState, state_path: &Path) -> Result<RecoveryReport> {
    let mut report = RecoveryReport::default();

    let current = StepDirectory::new(state.step_dir(state.step_index_current));
    if !current.is_committed() {
        // The state advanced but the marker never landed
        let index = state.step_index_current;
        if index == 0 {
            return Err(GrowError::Consistency {
                reason: "initial step is not committed".to_string(),
            });
        }
        let before_path = current.file(CANVAS_BEFORE_FILE);
        let before = load_rgb(&before_path).map_err(|_err| GrowError::Consistency {
            reason: format!(
                "step {index} is uncommitted and has no readable '{}'",
                before_path.display()
            ),
        })?;

        let mut rolled_back = state.clone();
        rolled_back.step_index_current = index - 1;
        rolled_back.set_expected_size(before.dimensions());
        if !StepDirectory::new(rolled_back.step_dir(index - 1)).is_committed() {
            return Err(GrowError::Consistency {
                reason: format!("neither step {index} nor step {} is committed", index - 1),
            });
        }

        write_png(&state.canvas_path(), &before)?;
        rolled_back.save(state_path)?;
        *state = rolled_back;
        report.rolled_back_step = Some(index);
        report.restored_canvas = true;
        tracing::warn!(step = index, "Rolled back half-committed step");
    }

    let canvas_path = state.canvas_path();
    let pointer_size = match image_dimensions(&canvas_path) {
        Ok(size) => Some(size),
        Err(GrowError::NotFound { .. } | GrowError::ImageDecode { .. }) => None,
        Err(err) => return Err(err),
    };
    if pointer_size != Some(state.expected_size()) {
        let snapshot_path = committed_snapshot(state);
        let snapshot = load_rgb(&snapshot_path)?;
        if snapshot.dimensions() != state.expected_size() {
            return Err(GrowError::Consistency {
                reason: format!(
                    "snapshot '{}' is {}x{}, state expects {}x{}",
                    snapshot_path.display(),
                    snapshot.width(),
                    snapshot.height(),
                    state.canvas_width_expected,
                    state.canvas_height_expected
                ),
            });
        }
        write_png(&canvas_path, &snapshot)?;
        report.restored_canvas = true;
        tracing::warn!(
            snapshot = %snapshot_path.display(),
            "Restored canvas pointer from committed snapshot"
        );
    }

    for record in scan_steps(&state.steps_path())? {
        if record.index <= state.step_index_current {
            continue;
        }
        if record.committed {
            return Err(GrowError::Consistency {
                reason: format!(
                    "step {} is committed beyond current step {}",
                    record.index, state.step_index_current
                ),
            });
        }
        if let Some(archived) = archive_step_dir(&record.path)? {
            report.archived.push(archived);
        }
    }

    Ok(report)
}
