// ============================================================================
// ethovid-core/src/error.rs
// ============================================================================
//
// ERROR TYPES: Crate-wide Error Taxonomy
//
// This module defines the error kinds raised by every component of the
// system (motion analyzer, profile registry, segment encoder, adaptive
// compressor, job orchestrator, progress bus). Fatal, job-ending failures
// and caller-facing validation/lookup failures share one enum so callers
// have a single type to match on.
//
// AI-ASSISTANT-INFO: Error types for the Ethovid core library

use std::io;
use std::process::ExitStatus;

/// Kind of failure that occurred while running an external command (ffmpeg/ffprobe).
#[derive(Debug)]
pub enum CommandErrorKind {
    /// The process could not be started.
    Start(io::Error),
    /// The process was started but waiting on it failed.
    Wait(io::Error),
    /// The process exited with a nonzero status.
    Failed(ExitStatus, String),
}

/// An error that occurred while running an external command.
#[derive(Debug)]
pub struct CommandError {
    pub command: String,
    pub kind: CommandErrorKind,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CommandErrorKind::Start(e) => write!(f, "failed to start '{}': {}", self.command, e),
            CommandErrorKind::Wait(e) => write!(f, "failed waiting on '{}': {}", self.command, e),
            CommandErrorKind::Failed(status, stderr_tail) => write!(
                f,
                "'{}' exited with {}: {}",
                self.command, status, stderr_tail
            ),
        }
    }
}

impl std::error::Error for CommandError {}

/// The crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid path: {0}")]
    PathError(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to parse JSON: {0}")]
    JsonError(String),

    /// Input path missing, empty, or the first frame could not be decoded.
    #[error("could not open source video {path}: {reason}")]
    SourceOpenError { path: String, reason: String },

    /// Fewer than one second of decodable video was available.
    #[error("source has less than one second of decodable video ({decoded_frames} frames at {fps} fps)")]
    InsufficientFramesError { decoded_frames: u64, fps: f64 },

    /// External encoder exited nonzero or its output could not be parsed.
    #[error("encoder failed: {0}")]
    EncoderFailure(String),

    /// Demuxer-concat step exited nonzero.
    #[error("failed to concatenate segments: {0}")]
    ConcatFailure(String),

    /// Out-of-range CRF/FPS/preset/profile tag, rejected at validation time.
    #[error("invalid encoder settings: {0}")]
    InvalidSettings(String),

    /// Orchestrator state-machine violation.
    #[error("cannot transition job from {from:?} to {to:?}")]
    InvalidTransition { from: String, to: String },

    /// Lookup miss for a profile name.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// Lookup miss for a job id.
    #[error("unknown job: {0}")]
    UnknownJob(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CommandError {
        command: command.into(),
        kind: CommandErrorKind::Start(err),
    }
    .into()
}

pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CommandError {
        command: command.into(),
        kind: CommandErrorKind::Wait(err),
    }
    .into()
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr_tail: impl Into<String>,
) -> CoreError {
    CommandError {
        command: command.into(),
        kind: CommandErrorKind::Failed(status, stderr_tail.into()),
    }
    .into()
}
