// ============================================================================
// ethovid-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument Definitions
//
// Defines the command-line interface for the Ethovid CLI using clap: the top
// level `Cli` struct, the `Commands` enum, and each subcommand's arguments.
//
// USAGE EXAMPLES:
// - ethovid submit input.mp4 output.mp4 --profile balanced
// - ethovid submit input.mp4 output.mp4 --profile aggressive --roi --watch
// - ethovid status <job-id>
// - ethovid list
// - ethovid cancel <job-id>
// - ethovid recommend input.mp4
//
// AI-ASSISTANT-INFO: CLI argument definitions using clap, includes all command parameters

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure: global flags plus the subcommand to execute.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ethovid: motion-aware adaptive video compression",
    long_about = "Submits, watches, and manages motion-aware adaptive compression jobs \
                  against the ethovid-core job orchestrator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of formatted terminal output
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Disable colored terminal output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a video for adaptive compression
    Submit(SubmitArgs),

    /// Query a single job's current status and progress history
    Status {
        /// Job ID returned by `submit`
        job_id: String,
    },

    /// List every active (non-terminal) job
    List,

    /// Cancel a queued or running job
    Cancel {
        /// Job ID to cancel
        job_id: String,
    },

    /// Recommend a compression profile for an input file without submitting a job
    Recommend {
        /// Input file to analyze
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Input video file
    pub input: PathBuf,

    /// Destination path for the compressed output
    pub output: PathBuf,

    /// Compression profile: conservative, balanced, aggressive, or a registered custom name
    #[arg(long, default_value = "balanced")]
    pub profile: String,

    /// Apply a CRF/bitrate discount to segments above the ROI intensity threshold
    #[arg(long, default_value_t = false)]
    pub roi: bool,

    /// Priority within the worker queue: low, normal, high, urgent
    #[arg(long, default_value = "normal")]
    pub priority: String,

    /// Stay attached and stream live progress until the job finishes
    #[arg(short, long, default_value_t = false)]
    pub watch: bool,
}
