// ============================================================================
// ethovid-core/src/motion/mod.rs
// ============================================================================
//
// MOTION ANALYZER: Frame Source, Intensity Fusion, Segmentation (component B,
// plus the frame source abstraction, component A)
//
// AI-ASSISTANT-INFO: Module declarations and re-exports for motion analysis

mod analyzer;
mod frame_source;
mod intensity;
mod roi;
mod types;

pub use analyzer::{activity_ratio, analyze, build_segments, derive_periods};
pub use frame_source::{DecodedFrame, FrameSource};
pub use intensity::{combined_intensity, FrameComponents, FrameIntensityComputer};
pub use roi::{pad_and_clamp, Rect, RoiExtractor, ROI_MIN_DIM, ROI_MIN_CONTOUR_AREA, ROI_PADDING_PX};
pub use types::{
    ActivityLevel, ActivitySegment, AnalysisProgress, MotionAnalysisResult, NullAnalysisProgress,
    TimeRange,
};
