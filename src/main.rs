//! CLI entry point for crash-safe directional canvas growth

use clap::Parser;
use tilegrow::io::cli::{Cli, CommandRunner};
use tilegrow::io::logging::init_logging;

fn main() -> tilegrow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    CommandRunner::new(cli).run()
}
