//! # ethovid-core
//!
//! Core library for motion-aware adaptive video compression of long-duration
//! behavioral recordings.
//!
//! ## Overview
//!
//! This crate analyzes a source video for motion activity, derives a
//! segment-by-segment compression plan from that activity, re-encodes each
//! segment through an external H.264 encoder at the plan's settings, and
//! losslessly stitches the segments back into one output file. A job
//! orchestrator sits on top of the compressor, accepting submissions onto a
//! priority queue served by a fixed-size worker pool, and a typed progress
//! event bus lets callers subscribe to per-job or global progress updates.
//!
//! ## Architecture
//!
//! The library follows a dependency-injection design: traits define the
//! seams to external tools and subsystems (`FrameSource`,
//! `FrameIntensityComputer`, `RoiExtractor`, `FfmpegSpawner`,
//! `FfprobeExecutor`), and production implementations sit behind the
//! `opencv`/`ffmpeg-sidecar`/`ffprobe` crates. The `test-mocks` feature
//! exposes in-memory stand-ins for each trait so the higher-level
//! compressor and orchestrator logic can be exercised without a real video
//! file or encoder binary.
//!
//! ## Module Structure
//!
//! The crate is organized into several modules:
//! - `config`: Defines configuration structures (`CoreConfig`) used throughout the library.
//! - `error`: Defines the crate-wide error type (`CoreError`) and result alias (`CoreResult`).
//! - `motion`: Frame source abstraction, intensity fusion, and activity segmentation (components A/B).
//! - `profiles`: The named activity-to-encoder-settings profile registry (component C).
//! - `encoding`: External encoder invocation and lossless segment concatenation (components D/E).
//! - `external`: Production implementations of the frame-source/intensity/ffprobe traits, plus mocks.
//! - `compressor`: The adaptive compressor tying analysis, planning, and encoding into one job (component E).
//! - `progress`: The typed progress event bus and bounded per-job history (component G).
//! - `orchestrator`: Job submission, priority queue, and fixed-size worker pool (component F).
//!
//! ## Public API
//!
//! This `lib.rs` file re-exports the primary public interface elements from
//! the internal modules, making them directly accessible to users of the
//! `ethovid-core` crate.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ethovid_core::config::CoreConfigBuilder;
//! use ethovid_core::external::{CrateFfprobeExecutor, MotionIntensityComputer, OpencvFrameSource};
//! use ethovid_core::encoding::SidecarSpawner;
//! use ethovid_core::{AdaptiveCompressor, JobOrchestrator, JobPriority, ProfileRegistry, ProgressBus, SubmitRequest};
//!
//! let config = CoreConfigBuilder::new()
//!     .output_dir("/path/to/output".into())
//!     .worker_pool_size(2)
//!     .build();
//!
//! let profiles = Arc::new(ProfileRegistry::new());
//! let bus = ProgressBus::new();
//! let intensity_config = config.clone();
//!
//! let compressor = AdaptiveCompressor::new(
//!     config,
//!     profiles.clone(),
//!     bus,
//!     SidecarSpawner,
//!     Arc::new(|path| Ok(Box::new(OpencvFrameSource::open(path)?) as Box<_>)),
//!     Arc::new(move || Ok(Box::new(MotionIntensityComputer::new(&intensity_config)?) as Box<_>)),
//! );
//!
//! let orchestrator = JobOrchestrator::new(compressor, profiles, 2);
//! let job_id = orchestrator.submit(SubmitRequest {
//!     input_path: "/videos/session_01.mp4".into(),
//!     output_path: "/out/session_01.mp4".into(),
//!     profile_name: "balanced".to_string(),
//!     roi_enabled: false,
//!     priority: JobPriority::Normal,
//! }).unwrap();
//! let _ = CrateFfprobeExecutor; // production ffprobe executor, used by CLI analysis commands
//! println!("submitted {job_id}");
//! ```
//!
//! ## AI-ASSISTANT-INFO
//!
//! Core library for motion-aware adaptive video compression: analysis, profile planning, segment encoding, and job orchestration

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

/// Configuration structures and constants used throughout the library
pub mod config;

/// Custom error types and result definitions
pub mod error;

/// Frame source abstraction, motion intensity fusion, and activity segmentation
pub mod motion;

/// Named activity-to-encoder-settings profile registry
pub mod profiles;

/// External encoder invocation and segment concatenation
pub mod encoding;

/// Production and mock implementations of the external-facing traits
pub mod external;

/// The adaptive compressor: analysis, segment planning, and encoding for one job
pub mod compressor;

/// The typed progress event bus and bounded per-job history
pub mod progress;

/// Job submission, priority queue, and fixed-size worker pool
pub mod orchestrator;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================
// These items are re-exported to make them directly accessible to users
// without requiring explicit imports from submodules

// ----- Configuration Types -----
pub use config::CoreConfig;

// ----- Error Handling -----
/// Custom error types and result type alias
pub use error::{CoreError, CoreResult};

// ----- Motion Analysis -----
pub use motion::{
    ActivityLevel, ActivitySegment, FrameIntensityComputer, FrameSource, MotionAnalysisResult,
    RoiExtractor,
};

// ----- Profiles -----
pub use profiles::{ActivityProfile, EncoderSettings, ProfileRegistry};

// ----- Encoding -----
pub use encoding::{FfmpegProcess, FfmpegSpawner};

// ----- Adaptive Compressor -----
pub use compressor::{AdaptiveCompressor, JobRecord, JobStatus};

// ----- Progress Bus -----
pub use progress::{ProgressBus, ProgressEvent, ProgressEventType};

// ----- Job Orchestrator -----
pub use orchestrator::{JobOrchestrator, JobPriority, SubmitRequest};
