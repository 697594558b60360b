// ============================================================================
// ethovid-core/src/motion/types.rs
// ============================================================================
//
// MOTION DATA MODEL: Activity Levels, Segments, and Analysis Results
//
// AI-ASSISTANT-INFO: Data model for the motion analyzer (component B)

use serde::{Deserialize, Serialize};

/// Discrete activity label assigned to a frame or segment from motion intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    High,
    Medium,
    Low,
    Inactive,
}

impl ActivityLevel {
    /// Classifies a motion intensity value using the given thresholds.
    /// `high >= high_threshold`, `medium >= medium_threshold`, `low >= low_threshold`, else `inactive`.
    pub fn classify(intensity: f64, high: f64, medium: f64, low: f64) -> Self {
        if intensity >= high {
            ActivityLevel::High
        } else if intensity >= medium {
            ActivityLevel::Medium
        } else if intensity >= low {
            ActivityLevel::Low
        } else {
            ActivityLevel::Inactive
        }
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, ActivityLevel::Inactive)
    }
}

/// Half-open time interval `[start_time, end_time)` with a uniform activity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySegment {
    pub start_time: f64,
    pub end_time: f64,
    pub activity_level: ActivityLevel,
    pub motion_intensity: f64,
    pub frame_start: u64,
    pub frame_end: u64,
}

impl ActivitySegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A maximal run of consecutive segments sharing a coarse behavioral state
/// (sleep = consecutive inactive segments; active = consecutive non-inactive segments).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// The full output of the motion analyzer: the per-frame intensity timeline,
/// the derived activity segments, and the coarser sleep/active periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionAnalysisResult {
    pub motion_timeline: Vec<f64>,
    pub activity_segments: Vec<ActivitySegment>,
    pub sleep_periods: Vec<TimeRange>,
    pub active_periods: Vec<TimeRange>,
    pub total_duration: f64,
    pub total_frames: u64,
    pub fps: f64,
    pub overall_activity_ratio: f64,
    pub analysis_timestamp: chrono::DateTime<chrono::Utc>,
}

/// Progress callback invoked roughly every 30 frames during analysis.
pub trait AnalysisProgress {
    fn on_progress(&self, percent: f64, stage: &str);
}

impl<F: Fn(f64, &str)> AnalysisProgress for F {
    fn on_progress(&self, percent: f64, stage: &str) {
        self(percent, stage)
    }
}

/// No-op progress sink.
pub struct NullAnalysisProgress;

impl AnalysisProgress for NullAnalysisProgress {
    fn on_progress(&self, _percent: f64, _stage: &str) {}
}
