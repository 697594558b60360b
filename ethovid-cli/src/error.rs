// ============================================================================
// ethovid-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Context Wrapping Over Core Errors
//
// `ethovid-core` carries a closed `CoreError` enum for the library's own
// fallible operations. The CLI layer sits one level up: it needs to attach
// human-facing context ("while resolving --input", "while reading job-id
// from stdin") without growing the core's error type for CLI-only concerns,
// so it reaches for `anyhow` the way the rest of the pack's CLIs do.
//
// AI-ASSISTANT-INFO: CLI-level error type and context helpers

use anyhow::{Context, Result};

pub type CliResult<T> = Result<T>;

/// Adds CLI-facing context to a `Result`/`Option`, mirroring
/// `anyhow::Context` but named for call-site readability in command
/// handlers (`value.cli_context("reading job status")?`).
pub trait CliErrorContext<T> {
    fn cli_context(self, context: &'static str) -> CliResult<T>;
    fn cli_with_context<F, C>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display + Send + Sync + 'static;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn cli_context(self, context: &'static str) -> CliResult<T> {
        self.with_context(|| context.to_string())
    }

    fn cli_with_context<F, C>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.with_context(f)
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context(self, context: &'static str) -> CliResult<T> {
        self.ok_or_else(|| anyhow::anyhow!(context))
    }

    fn cli_with_context<F, C>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| anyhow::anyhow!(f().to_string()))
    }
}
