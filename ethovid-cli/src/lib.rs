//! # ethovid-cli
//!
//! Command-line front end over `ethovid-core`: submits motion-aware
//! adaptive compression jobs to an in-process job orchestrator, watches
//! their progress through a live terminal progress bar, and queries or
//! cancels jobs by ID.
//!
//! ## Module Structure
//! - `cli`: clap argument/subcommand definitions.
//! - `commands`: one handler module per subcommand (`submit`, `status`,
//!   `list`, `cancel`, `recommend`), sharing an `AppContext`.
//! - `error`: `anyhow`-based CLI error context helpers.
//! - `logging`: `fern`/`log` setup for combined CLI + core log output.
//! - `terminal`: colored section/status printing and the live progress bar.
//! - `progress`: the `--watch` progress-bus subscriber driving the bar.
//! - `config`: CLI-only constants, distinct from `ethovid_core::CoreConfig`.
//!
//! AI-ASSISTANT-INFO: Module declarations and re-exports for the CLI crate

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

pub use cli::{Cli, Commands, SubmitArgs};
pub use commands::AppContext;
