//! Persisted session metadata and on-disk layout

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::{GrowthContract, GrowthMode};
use crate::io::configuration::{CANVAS_FILE, STATE_FILE, STEPS_DIR, STEP_DIR_DIGITS};
use crate::io::error::{GrowError, Result, persistence_error};
use crate::session::atomic::write_json;

/// File and directory names inside a session root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    /// Canvas pointer file
    pub canvas_file: String,
    /// Session metadata file
    pub state_file: String,
    /// Directory holding one subdirectory per step
    pub steps_dir: String,
}

impl Default for SessionLayout {
    fn default() -> Self {
        Self {
            canvas_file: CANVAS_FILE.to_string(),
            state_file: STATE_FILE.to_string(),
            steps_dir: STEPS_DIR.to_string(),
        }
    }
}

/// Contents of `session_state.json`
///
/// The only mutable authoritative record of a session. Together with the
/// canvas pointer it must always describe a canvas of
/// `canvas_width_expected` x `canvas_height_expected` pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier
    pub session_id: String,
    /// Absolute session root
    pub session_root: PathBuf,
    /// Canvas pointer file name relative to the root
    pub canvas_file: String,
    /// Steps directory name relative to the root
    pub steps_dir: String,
    /// Growth direction, fixed at creation
    pub mode: GrowthMode,
    /// Side of a square tile
    pub tile_size: u32,
    /// Band thickness along the growth axis
    pub band_size: u32,
    /// Overlap width along the growth axis
    pub overlap: u32,
    /// Canvas growth per committed step
    pub advance: u32,
    /// Canvas width after the last committed step
    pub canvas_width_expected: u32,
    /// Canvas height after the last committed step
    pub canvas_height_expected: u32,
    /// Index of the last committed step, 0 for a fresh session
    pub step_index_current: u64,
}

impl SessionState {
    /// Growth contract recorded in the state
    pub const fn contract(&self) -> GrowthContract {
        GrowthContract {
            tile_size: self.tile_size,
            band_size: self.band_size,
            overlap: self.overlap,
            advance: self.advance,
        }
    }

    /// Expected canvas (width, height)
    pub const fn expected_size(&self) -> (u32, u32) {
        (self.canvas_width_expected, self.canvas_height_expected)
    }

    /// Record a new expected canvas size
    pub const fn set_expected_size(&mut self, size: (u32, u32)) {
        self.canvas_width_expected = size.0;
        self.canvas_height_expected = size.1;
    }

    /// Absolute path of the canvas pointer
    pub fn canvas_path(&self) -> PathBuf {
        self.session_root.join(&self.canvas_file)
    }

    /// Absolute path of the steps directory
    pub fn steps_path(&self) -> PathBuf {
        self.session_root.join(&self.steps_dir)
    }

    /// Absolute path of the directory for step `index`
    pub fn step_dir(&self, index: u64) -> PathBuf {
        self.steps_path().join(step_dir_name(index))
    }

    /// Read and parse a state file
    ///
    /// # Errors
    ///
    /// Returns not-found, persistence or serialization errors
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GrowError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(persistence_error(path, "read state"))?;
        serde_json::from_str(&text).map_err(|source| GrowError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Durably write the state to `path`
    ///
    /// # Errors
    ///
    /// Returns serialization or persistence errors
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

/// Zero-padded directory name of step `index`
pub fn step_dir_name(index: u64) -> String {
    format!("{index:0width$}", width = STEP_DIR_DIGITS)
}

/// Parse a step directory name produced by [`step_dir_name`]
pub fn parse_step_dir_name(name: &str) -> Option<u64> {
    if name.len() < STEP_DIR_DIGITS || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}
