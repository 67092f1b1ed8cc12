//! Growth contract constants and runtime configuration defaults

/// Edge length of every generated tile, and of the canvas cross axis
pub const TILE_SIZE: u32 = 1024;

/// Thickness of the conditioning band cut from the canvas frontier
pub const BAND_SIZE: u32 = 512;

/// Existing frontier pixels overwritten by each step to allow blending
pub const DEFAULT_OVERLAP: u32 = 256;

/// Net growth of the canvas per committed step
pub const DEFAULT_ADVANCE: u32 = 512;

/// Feather width; zero keeps the hard replace contract
pub const DEFAULT_FEATHER: u32 = 0;

/// Candidates requested from the generator per step
pub const DEFAULT_CANDIDATES: usize = 1;

// Upper bound guards against accidental fan-out to paid collaborators
/// Maximum candidates per step
pub const MAX_CANDIDATES: usize = 16;

/// Seam scoring weight at the pixel touching the seam
pub const SEAM_WEIGHT_NEAR: f64 = 1.0;
/// Seam scoring weight at the far edge of the scoring strip
pub const SEAM_WEIGHT_FAR: f64 = 0.2;

// Persisted layout
/// Authoritative canvas file name inside the session root
pub const CANVAS_FILE: &str = "canvas_latest.png";
/// Session metadata file name inside the session root
pub const STATE_FILE: &str = "session_state.json";
/// Directory holding numbered step directories
pub const STEPS_DIR: &str = "steps";
/// Zero padding width of step directory names
pub const STEP_DIR_DIGITS: usize = 4;
/// Terminal commit marker, written last
pub const COMMIT_MARKER: &str = "committed.ok";
/// Diagnostic record of a rejected attempt
pub const REJECTION_FILE: &str = "rejected.json";
/// Suffix for step directories moved aside by recovery or retries
pub const ABANDONED_SUFFIX: &str = "abandoned";
/// Archived attempts kept per step index; older ones are deleted
pub const MAX_ABANDONED_ATTEMPTS: usize = 8;

// Step artifacts
/// Step 0 snapshot of the initial canvas
pub const INITIAL_CANVAS_FILE: &str = "canvas_initial.png";
/// Prompt text as sent to the generator
pub const PROMPT_FILE: &str = "prompt.txt";
/// Conditioning band extracted from the frontier
pub const BAND_FILE: &str = "conditioning_band.png";
/// Reference canvas handed to image-conditioned generators
pub const REFERENCE_FILE: &str = "reference.png";
/// Preserve/edit mask paired with the reference
pub const MASK_FILE: &str = "mask.png";
/// Winning tile after post-enforcement
pub const TILE_FILE: &str = "tile_full.png";
/// Patch window of the winning tile that was pasted
pub const PATCH_FILE: &str = "tile_patch.png";
/// Generated half of the winning tile
pub const NEW_HALF_FILE: &str = "new_half.png";
/// Candidate score report
pub const SCORES_FILE: &str = "scores.json";
/// Canvas before the step
pub const CANVAS_BEFORE_FILE: &str = "canvas_before.png";
/// Canvas after the step
pub const CANVAS_AFTER_FILE: &str = "canvas_after.png";

// Reference builder cosmetic defaults
/// Downsample factor of the low-frequency scaffold
pub const SCAFFOLD_DOWNSAMPLE: u32 = 16;
/// Gaussian sigma applied to the upsampled scaffold
pub const SCAFFOLD_BLUR_SIGMA: f32 = 6.0;
/// Distance of the continuation cue from the keep boundary
pub const CUE_INSET: u32 = 4;
/// Thickness of the continuation cue line
pub const CUE_THICKNESS: u32 = 2;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Logging
/// Filter directive used when `RUST_LOG` is unset
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";
/// Filter directive forced by `--quiet`
pub const QUIET_LOG_DIRECTIVE: &str = "warn";

// Generator retries
/// Attempts per candidate for retryable generator failures
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;
/// Linear backoff unit between attempts, in milliseconds
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
