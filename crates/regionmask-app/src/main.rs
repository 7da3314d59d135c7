//! Command-line entry point: `regionmask <session.json>...`

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Replay recorded RegionMask sessions and write their masked exports.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Session files to replay, in order.
    #[arg(required = true)]
    sessions: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting RegionMask");

    let mut failed = false;
    for path in &cli.sessions {
        match regionmask_app::run_session(path) {
            Ok(summary) => log::info!(
                "{}: {} regions ({} closed), {} snapshots, {} bytes written",
                path.display(),
                summary.regions,
                summary.closed_regions,
                summary.snapshots,
                summary.output_bytes
            ),
            Err(e) => {
                log::error!("{}: {e}", path.display());
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
