// ============================================================================
// ethovid-cli/src/config.rs
// ============================================================================
//
// CLI CONFIGURATION CONSTANTS
//
// Plain constants distinct from `ethovid_core::CoreConfig` (which configures
// the library). These only shape how the CLI itself behaves.
//
// AI-ASSISTANT-INFO: CLI-level constants

/// Default worker pool size used when no `ETHOVID_WORKER_POOL_SIZE`
/// environment override is present.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 2;

/// Default profile name used by `submit` when `--profile` is omitted.
pub const DEFAULT_PROFILE: &str = "balanced";

/// Interval, in milliseconds, between progress bar redraws while `--watch`
/// is attached to a job.
pub const WATCH_POLL_INTERVAL_MS: u64 = 200;
