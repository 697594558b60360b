// ============================================================================
// ethovid-core/src/config/mod.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// Holds every key required to run the analyzer, compressor, and orchestrator:
// directories, worker pool size, default profile, analyzer thresholds and
// kernel sizes, upload size limits, and progress-history retention age.
//
// AI-ASSISTANT-INFO: Configuration structures and constants for the Ethovid core library

mod builder;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.08;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.04;
pub const DEFAULT_LOW_THRESHOLD: f64 = 0.01;

pub const DEFAULT_BG_BLUR_KERNEL: i32 = 21;
pub const DEFAULT_MORPH_KERNEL: i32 = 5;
pub const DEFAULT_FD_BLUR_KERNEL: i32 = 21;
pub const DEFAULT_FD_THRESHOLD: f64 = 20.0;

pub const DEFAULT_BG_WEIGHT: f64 = 0.5;
pub const DEFAULT_OF_WEIGHT: f64 = 0.3;
pub const DEFAULT_FD_WEIGHT: f64 = 0.2;

pub const DEFAULT_MAX_SEGMENT_SECONDS: f64 = 10.0;
pub const DEFAULT_MIN_INACTIVE_DURATION: f64 = 30.0;

pub const DEFAULT_WORKER_POOL_SIZE: usize = 1;
pub const DEFAULT_PROFILE_NAME: &str = "balanced";
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024 * 1024; // 10 GiB
pub const DEFAULT_HISTORY_RETENTION_SECS: u64 = 24 * 3600;
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 100;

/// Main configuration structure for the Ethovid core library.
///
/// Instances are created by consumers of the library (like `ethovid-cli`)
/// and passed to the job orchestrator / adaptive compressor.
///
/// # Examples
///
/// ```rust,no_run
/// use ethovid_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/input"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .temp_dir(PathBuf::from("/path/to/temp"))
///     .worker_pool_size(2)
///     .default_profile("balanced")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Path Configuration ----
    /// Directory containing input video files to process.
    pub input_dir: PathBuf,
    /// Directory where final compressed outputs and segment/analysis scratch live.
    pub output_dir: PathBuf,
    /// Directory incoming uploads are staged in before a job is submitted.
    pub upload_dir: PathBuf,
    /// Directory for per-job temporary segment files.
    pub temp_dir: PathBuf,

    // ---- Worker Model ----
    /// Number of worker threads in the orchestrator's fixed-size pool.
    pub worker_pool_size: usize,

    // ---- Profiles ----
    /// Name of the built-in or custom profile used when a job doesn't specify one.
    pub default_profile: String,

    // ---- Motion Analyzer Thresholds ----
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub low_threshold: f64,

    // ---- Motion Analyzer Kernel Sizes / Weights ----
    pub bg_blur_kernel: i32,
    pub morph_kernel: i32,
    pub fd_blur_kernel: i32,
    pub fd_threshold: f64,
    pub bg_weight: f64,
    pub of_weight: f64,
    pub fd_weight: f64,

    // ---- Segmentation ----
    pub max_segment_seconds: f64,
    pub min_inactive_duration: f64,

    // ---- Limits ----
    /// Maximum accepted input file size, in bytes.
    pub max_file_size_bytes: u64,

    // ---- Progress History ----
    /// Age, in seconds, after which a finished job's progress history is evicted.
    pub history_retention_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            upload_dir: PathBuf::from("./uploads"),
            temp_dir: std::env::temp_dir(),

            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,

            default_profile: DEFAULT_PROFILE_NAME.to_string(),

            high_threshold: DEFAULT_HIGH_THRESHOLD,
            medium_threshold: DEFAULT_MEDIUM_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,

            bg_blur_kernel: DEFAULT_BG_BLUR_KERNEL,
            morph_kernel: DEFAULT_MORPH_KERNEL,
            fd_blur_kernel: DEFAULT_FD_BLUR_KERNEL,
            fd_threshold: DEFAULT_FD_THRESHOLD,
            bg_weight: DEFAULT_BG_WEIGHT,
            of_weight: DEFAULT_OF_WEIGHT,
            fd_weight: DEFAULT_FD_WEIGHT,

            max_segment_seconds: DEFAULT_MAX_SEGMENT_SECONDS,
            min_inactive_duration: DEFAULT_MIN_INACTIVE_DURATION,

            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,

            history_retention_secs: DEFAULT_HISTORY_RETENTION_SECS,
        }
    }
}

impl CoreConfig {
    /// Loads overrides from `ETHOVID_*` environment variables, layered over
    /// the supplied base (typically `CoreConfig::default()`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("ETHOVID_WORKER_POOL_SIZE") {
            if let Ok(n) = v.parse() {
                self.worker_pool_size = n;
            }
        }
        if let Ok(v) = std::env::var("ETHOVID_DEFAULT_PROFILE") {
            self.default_profile = v;
        }
        if let Ok(v) = std::env::var("ETHOVID_MAX_FILE_SIZE_BYTES") {
            if let Ok(n) = v.parse() {
                self.max_file_size_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("ETHOVID_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ETHOVID_INPUT_DIR") {
            self.input_dir = PathBuf::from(v);
        }
        self
    }
}
