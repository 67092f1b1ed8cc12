//! Step progress display for multi-step runs

use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::session::store::{StepResult, StepStatus};

static STEP_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "[{{elapsed_precise}}] Steps: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Tracks committed and rejected steps of one run
pub struct StepProgress {
    bar: ProgressBar,
    committed: u64,
    rejected: u64,
}

impl StepProgress {
    /// Progress over `total_steps`; hidden when `visible` is false
    pub fn new(total_steps: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_steps)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(STEP_STYLE.clone());
        Self {
            bar,
            committed: 0,
            rejected: 0,
        }
    }

    /// Announce the step about to run
    pub fn start_step(&self, step_index: u64) {
        self.bar.set_message(format!("step {step_index}"));
    }

    /// Record the outcome of a step
    pub fn record(&mut self, result: &StepResult) {
        match result.status {
            StepStatus::Committed => {
                self.committed += 1;
                self.bar.inc(1);
                let (width, height) = result.canvas_size_after;
                self.bar
                    .set_message(format!("step {} -> {width}x{height}", result.step_index));
            }
            StepStatus::Rejected => {
                self.rejected += 1;
                self.bar
                    .set_message(format!("step {} rejected", result.step_index));
            }
        }
    }

    /// Steps committed so far
    pub const fn committed(&self) -> u64 {
        self.committed
    }

    /// Steps rejected so far
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Position of the bar
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Clear the display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
