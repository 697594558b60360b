// ============================================================================
// ethovid-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL: Concrete Backends for the Decoupling Traits
//
// `opencv_capture` implements `FrameSource`/`FrameIntensityComputer`/
// `RoiExtractor` against the `opencv` crate; `ffprobe` probes a source's
// duration/fps/resolution ahead of opening it; `mocks` (feature-gated)
// substitutes in-memory stand-ins for unit and integration tests.
//
// AI-ASSISTANT-INFO: Module declarations and re-exports for external backends

mod ffprobe;
mod opencv_capture;

#[cfg(feature = "test-mocks")]
pub mod mocks;

pub use ffprobe::{CrateFfprobeExecutor, FfprobeExecutor, VideoProperties};
pub use opencv_capture::{MotionIntensityComputer, MotionRoiExtractor, OpencvFrameSource};
