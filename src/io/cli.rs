//! Command-line interface for creating, growing and repairing sessions

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::conditioning::ReferenceConfig;
use crate::conditioning::reference::CueConfig;
use crate::conditioning::scaffold::ScaffoldConfig;
use crate::generator::mock::{MockFill, MockGenerator};
use crate::generator::retry::RetryingGenerator;
use crate::geometry::{GrowthContract, GrowthMode};
use crate::io::configuration::{
    DEFAULT_ADVANCE, DEFAULT_CANDIDATES, DEFAULT_FEATHER, DEFAULT_OVERLAP, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_BACKOFF_MS, TILE_SIZE,
};
use crate::io::error::{GrowError, Result, persistence_error};
use crate::io::image::load_rgb;
use crate::io::progress::StepProgress;
use crate::pipeline::step::StepOptions;
use crate::session::artifacts::{RejectionRecord, placement_convention};
use crate::session::recovery::scan_steps;
use crate::session::state::SessionState;
use crate::session::store::{SessionConfig, SessionStore};

#[derive(Parser)]
#[command(name = "tilegrow")]
#[command(
    author,
    version,
    about = "Grow a canvas one tile at a time with crash-safe commits"
)]
/// Command-line arguments for the canvas growth tool
pub struct Cli {
    /// Only log warnings and errors, hide progress
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Session operations
#[derive(Subcommand)]
pub enum Command {
    /// Create a session from a square initial canvas
    Create(CreateArgs),
    /// Run one or more growth steps
    Step(StepArgs),
    /// Print session state as JSON
    Status(SessionArgs),
    /// Reconcile a session after a crash
    Recover(SessionArgs),
}

/// Arguments of `create`
#[derive(Args)]
pub struct CreateArgs {
    /// Directory that will hold the session directory
    #[arg(value_name = "ARTIFACT_ROOT")]
    pub artifact_root: PathBuf,

    /// Initial canvas PNG, exactly tile-size square
    #[arg(short, long)]
    pub initial: PathBuf,

    /// Growth direction
    #[arg(short, long, value_enum, default_value_t = GrowthMode::GrowRight)]
    pub mode: GrowthMode,

    /// Side of a square tile in pixels
    #[arg(long, default_value_t = TILE_SIZE)]
    pub tile_size: u32,

    /// Overlap width in pixels
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    pub overlap: u32,

    /// Canvas growth per step in pixels
    #[arg(long, default_value_t = DEFAULT_ADVANCE)]
    pub advance: u32,

    /// Session identifier, random when omitted
    #[arg(long)]
    pub session_id: Option<String>,
}

impl CreateArgs {
    /// Growth contract described by the arguments
    pub const fn contract(&self) -> GrowthContract {
        GrowthContract {
            tile_size: self.tile_size,
            band_size: self.tile_size / 2,
            overlap: self.overlap,
            advance: self.advance,
        }
    }
}

/// Fill used by the built-in offline generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FillArg {
    /// Seeded noise
    Noise,
    /// Band mirrored across the seam
    Mirror,
    /// Mid gray
    Gray,
}

impl From<FillArg> for MockFill {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Noise => Self::Noise,
            FillArg::Mirror => Self::Mirror,
            FillArg::Gray => Self::Solid([128, 128, 128]),
        }
    }
}

/// Arguments of `step`
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct StepArgs {
    /// Session directory
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Text prompt passed to the generator
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Number of steps to run; stops early on the first rejection
    #[arg(short = 'n', long, default_value_t = 1)]
    pub steps: u64,

    /// Candidates per step
    #[arg(short, long, default_value_t = DEFAULT_CANDIDATES)]
    pub candidates: usize,

    /// Feather width in pixels, 0 for a hard seam
    #[arg(short, long, default_value_t = DEFAULT_FEATHER)]
    pub feather: u32,

    /// Offline generator fill
    #[arg(long, value_enum, default_value_t = FillArg::Noise)]
    pub fill: FillArg,

    /// Generate candidates in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Build a reference tile and mask for the generator
    #[arg(short, long)]
    pub reference: bool,

    /// Keep the returned conditioning half as is
    #[arg(long)]
    pub no_post_enforce: bool,

    /// Accept tiles whose keep region differs from the band
    #[arg(long)]
    pub no_identity_check: bool,
}

impl StepArgs {
    /// Step options described by the arguments
    pub fn options(&self) -> StepOptions {
        StepOptions {
            candidate_count: self.candidates,
            feather_px: self.feather,
            enforce_band_identity: !self.no_identity_check,
            post_enforce_keep: !self.no_post_enforce,
            parallel: self.parallel,
            reference: self.reference.then(|| ReferenceConfig {
                scaffold: Some(ScaffoldConfig::default()),
                continuation_cue: Some(CueConfig::default()),
                ..ReferenceConfig::default()
            }),
        }
    }
}

/// Arguments naming an existing session
#[derive(Args)]
pub struct SessionArgs {
    /// Session directory
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,
}

/// JSON printed by `status`
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Persisted session state
    #[serde(flatten)]
    pub state: SessionState,
    /// Where tiles sit relative to the canvas in this session's mode
    pub placement: String,
    /// Step directories beyond the current step that lack a commit marker
    pub uncommitted_steps: Vec<u64>,
    /// Why the latest attempt at the next step was rejected
    pub last_rejection: Option<RejectionRecord>,
}

/// Executes a parsed command line
pub struct CommandRunner {
    cli: Cli,
}

impl CommandRunner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command
    ///
    /// # Errors
    ///
    /// Returns any session, image or persistence error
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Command::Create(args) => Self::create(args),
            Command::Step(args) => self.step(args),
            Command::Status(args) => Self::status(&args.session),
            Command::Recover(args) => Self::recover(&args.session),
        }
    }

    fn create(args: &CreateArgs) -> Result<()> {
        let initial = load_rgb(&args.initial)?;
        let config = SessionConfig {
            contract: args.contract(),
            session_id: args.session_id.clone(),
            ..SessionConfig::default()
        };
        let store = SessionStore::create(&args.artifact_root, &initial, args.mode, &config)?;
        write_stdout_line(&store.root().display().to_string())
    }

    fn step(&self, args: &StepArgs) -> Result<()> {
        let mut store = SessionStore::open(&args.session)?;
        let options = args.options();
        let generator = RetryingGenerator::new(
            MockGenerator::new(store.contract(), args.fill.into()),
            DEFAULT_RETRY_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        );

        let mut progress = StepProgress::new(args.steps, self.cli.should_show_progress());
        for _ in 0..args.steps {
            progress.start_step(store.step_index() + 1);
            let result = store.execute_step(&args.prompt, &generator, &options)?;
            progress.record(&result);
            if let Some(rejection) = &result.rejection {
                tracing::warn!(
                    step = result.step_index,
                    class = %rejection.class,
                    reason = %rejection.reason,
                    "Stopping after rejected step"
                );
                break;
            }
        }
        progress.finish();

        tracing::info!(
            committed = progress.committed(),
            rejected = progress.rejected(),
            step = store.step_index(),
            "Run finished"
        );
        Ok(())
    }

    fn status(session: &Path) -> Result<()> {
        let store = SessionStore::open(session)?;
        let state = store.state().clone();
        let uncommitted_steps = scan_steps(&state.steps_path())?
            .into_iter()
            .filter(|record| record.index > state.step_index_current && !record.committed)
            .map(|record| record.index)
            .collect();
        let placement = placement_convention(state.mode, state.overlap, state.advance);
        let last_rejection = store.last_rejection()?;
        let report = StatusReport {
            state,
            placement,
            uncommitted_steps,
            last_rejection,
        };
        let json =
            serde_json::to_string_pretty(&report).map_err(|source| GrowError::Serialization {
                path: session.to_path_buf(),
                source,
            })?;
        write_stdout_line(&json)
    }

    fn recover(session: &Path) -> Result<()> {
        let mut store = SessionStore::open(session)?;
        let report = store.recover()?;
        if report.is_clean() {
            tracing::info!(step = store.step_index(), "Session is consistent");
        }
        Ok(())
    }
}

fn write_stdout_line(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").map_err(persistence_error("<stdout>", "write"))
}
