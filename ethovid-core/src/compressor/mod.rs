// ============================================================================
// ethovid-core/src/compressor/mod.rs
// ============================================================================
//
// ADAPTIVE COMPRESSOR: Job Record and Orchestration (component E)
//
// AI-ASSISTANT-INFO: Module declarations and re-exports for the adaptive compressor

mod adaptive;
mod job;

pub use adaptive::AdaptiveCompressor;
pub use job::{transition, JobRecord, JobStatus};
