// ============================================================================
// ethovid-core/src/motion/analyzer.rs
// ============================================================================
//
// MOTION ANALYZER: Per-frame Intensity, Segmentation, Sleep/Active Derivation
//
// `analyze` drives a `FrameSource` + `FrameIntensityComputer` to build the
// motion intensity timeline, then hands off to pure functions
// (`build_segments`, `derive_periods`) that contain no opencv dependency and
// are exercised directly by unit tests. Grounded on
// `motion_detector.py`'s `MotionDetector.analyze_video`,
// `_generate_activity_segments`, and `_identify_sleep_wake_cycles`.
//
// AI-ASSISTANT-INFO: Motion analyzer (component B)

use chrono::Utc;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::motion::frame_source::FrameSource;
use crate::motion::intensity::{combined_intensity, FrameIntensityComputer};
use crate::motion::types::{
    ActivityLevel, ActivitySegment, AnalysisProgress, MotionAnalysisResult, TimeRange,
};

const PROGRESS_FRAME_INTERVAL: u64 = 30;

/// Runs the full motion analysis pipeline over `source`.
pub fn analyze(
    source: &mut dyn FrameSource,
    intensity_computer: &mut dyn FrameIntensityComputer,
    config: &CoreConfig,
    progress: &dyn AnalysisProgress,
) -> CoreResult<MotionAnalysisResult> {
    let fps = source.fps();
    let expected_frames = source.frame_count();

    let mut timeline: Vec<f64> = Vec::with_capacity(expected_frames as usize);
    let mut decode_error: Option<CoreError> = None;

    let mut frame_index: u64 = 0;
    loop {
        let next = source.next_frame();
        match next {
            Ok(Some(frame)) => {
                let components = intensity_computer.compute(&frame)?;
                let intensity = combined_intensity(components, config);
                timeline.push(intensity);
                frame_index += 1;

                if frame_index % PROGRESS_FRAME_INTERVAL == 0 {
                    let percent = if expected_frames > 0 {
                        (frame_index as f64 / expected_frames as f64 * 100.0).min(100.0)
                    } else {
                        0.0
                    };
                    progress.on_progress(percent, "analyzing");
                }
            }
            Ok(None) => break,
            Err(e) => {
                decode_error = Some(e);
                break;
            }
        }
    }

    if timeline.is_empty() {
        return Err(decode_error.unwrap_or(CoreError::InsufficientFramesError {
            decoded_frames: 0,
            fps,
        }));
    }

    if let Some(err) = decode_error {
        // Truncate-and-continue only if at least one second was analyzed.
        if (timeline.len() as f64) < fps.max(1.0) {
            return Err(CoreError::InsufficientFramesError {
                decoded_frames: timeline.len() as u64,
                fps,
            });
        }
        log::warn!(
            "frame decode failed mid-stream after {} frames, truncating analysis: {}",
            timeline.len(),
            err
        );
    }

    progress.on_progress(100.0, "analyzing");

    let total_frames = timeline.len() as u64;
    let total_duration = total_frames as f64 / fps;

    let segments = build_segments(
        &timeline,
        fps,
        config.high_threshold,
        config.medium_threshold,
        config.low_threshold,
        config.max_segment_seconds,
    );

    let (sleep_periods, active_periods) =
        derive_periods(&segments, config.min_inactive_duration);

    let overall_activity_ratio = activity_ratio(&active_periods, total_duration);

    Ok(MotionAnalysisResult {
        motion_timeline: timeline,
        activity_segments: segments,
        sleep_periods,
        active_periods,
        total_duration,
        total_frames,
        fps,
        overall_activity_ratio,
        analysis_timestamp: Utc::now(),
    })
}

/// Walks the timeline, starting a new segment whenever the classified label
/// changes or the current segment reaches `ceil(fps * max_segment_seconds)`
/// frames. Pure function, no I/O.
pub fn build_segments(
    timeline: &[f64],
    fps: f64,
    high: f64,
    medium: f64,
    low: f64,
    max_segment_seconds: f64,
) -> Vec<ActivitySegment> {
    if timeline.is_empty() {
        return Vec::new();
    }

    let cap_frames = (fps * max_segment_seconds).ceil() as u64;
    let cap_frames = cap_frames.max(1);

    let mut segments = Vec::new();
    let mut seg_start_frame: u64 = 0;
    let mut seg_label = ActivityLevel::classify(timeline[0], high, medium, low);
    let mut seg_sum = 0.0f64;
    let mut seg_count: u64 = 0;

    for (i, &intensity) in timeline.iter().enumerate() {
        let label = ActivityLevel::classify(intensity, high, medium, low);
        let frame_idx = i as u64;

        if frame_idx != seg_start_frame && (label != seg_label || seg_count >= cap_frames) {
            segments.push(finish_segment(
                seg_start_frame,
                frame_idx,
                seg_label,
                seg_sum,
                seg_count,
                fps,
            ));
            seg_start_frame = frame_idx;
            seg_label = label;
            seg_sum = 0.0;
            seg_count = 0;
        }

        seg_sum += intensity;
        seg_count += 1;
    }

    segments.push(finish_segment(
        seg_start_frame,
        timeline.len() as u64,
        seg_label,
        seg_sum,
        seg_count,
        fps,
    ));

    segments
}

fn finish_segment(
    frame_start: u64,
    frame_end: u64,
    label: ActivityLevel,
    intensity_sum: f64,
    count: u64,
    fps: f64,
) -> ActivitySegment {
    let mean_intensity = if count > 0 {
        intensity_sum / count as f64
    } else {
        0.0
    };
    ActivitySegment {
        start_time: frame_start as f64 / fps,
        end_time: frame_end as f64 / fps,
        activity_level: label,
        motion_intensity: mean_intensity,
        frame_start,
        frame_end,
    }
}

/// Single pass over segments deriving maximal runs of inactive segments
/// (sleep periods, kept only if their total span meets `min_inactive_duration`)
/// and maximal runs of non-inactive segments (active periods).
pub fn derive_periods(
    segments: &[ActivitySegment],
    min_inactive_duration: f64,
) -> (Vec<TimeRange>, Vec<TimeRange>) {
    let mut sleep_periods = Vec::new();
    let mut active_periods = Vec::new();

    let mut inactive_since: Option<f64> = None;
    let mut active_since: Option<f64> = None;
    let mut last_end = 0.0f64;

    for seg in segments {
        if seg.activity_level.is_inactive() {
            if let Some(start) = active_since.take() {
                active_periods.push(TimeRange {
                    start,
                    end: seg.start_time,
                });
            }
            if inactive_since.is_none() {
                inactive_since = Some(seg.start_time);
            }
        } else {
            if let Some(start) = inactive_since.take() {
                let span = seg.start_time - start;
                if span >= min_inactive_duration {
                    sleep_periods.push(TimeRange {
                        start,
                        end: seg.start_time,
                    });
                }
            }
            if active_since.is_none() {
                active_since = Some(seg.start_time);
            }
        }
        last_end = seg.end_time;
    }

    if let Some(start) = inactive_since {
        if last_end - start >= min_inactive_duration {
            sleep_periods.push(TimeRange { start, end: last_end });
        }
    }
    if let Some(start) = active_since {
        active_periods.push(TimeRange { start, end: last_end });
    }

    (sleep_periods, active_periods)
}

/// `overall_activity_ratio = sum(active period durations) / total_duration`.
/// Pinned to this definition per the accepted design decision (see DESIGN.md).
pub fn activity_ratio(active_periods: &[TimeRange], total_duration: f64) -> f64 {
    if total_duration <= 0.0 {
        return 0.0;
    }
    let active_time: f64 = active_periods.iter().map(TimeRange::duration).sum();
    (active_time / total_duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_segments_splits_on_label_change() {
        let timeline = vec![0.9, 0.9, 0.0, 0.0];
        let segs = build_segments(&timeline, 2.0, 0.08, 0.04, 0.01, 10.0);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].activity_level, ActivityLevel::High);
        assert_eq!(segs[1].activity_level, ActivityLevel::Inactive);
        assert_eq!(segs[0].frame_start, 0);
        assert_eq!(segs[0].frame_end, 2);
        assert_eq!(segs[1].frame_start, 2);
        assert_eq!(segs[1].frame_end, 4);
    }

    #[test]
    fn build_segments_caps_long_runs_at_ten_seconds() {
        let fps = 30.0;
        let timeline = vec![0.9; (fps * 25.0) as usize];
        let segs = build_segments(&timeline, fps, 0.08, 0.04, 0.01, 10.0);
        // 25s of constant-high motion at a 10s cap -> 3 segments (10, 10, 5).
        assert_eq!(segs.len(), 3);
        for seg in &segs[..2] {
            assert!((seg.duration() - 10.0).abs() < 1e-9);
        }
        assert!((segs[2].duration() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segments_partition_the_timeline() {
        let timeline = vec![0.9, 0.05, 0.05, 0.0, 0.9, 0.9];
        let segs = build_segments(&timeline, 3.0, 0.08, 0.04, 0.01, 10.0);
        let mut cursor = 0u64;
        for seg in &segs {
            assert_eq!(seg.frame_start, cursor);
            cursor = seg.frame_end;
        }
        assert_eq!(cursor, timeline.len() as u64);
    }

    #[test]
    fn derive_periods_respects_min_inactive_duration() {
        let segments = vec![
            ActivitySegment {
                start_time: 0.0,
                end_time: 5.0,
                activity_level: ActivityLevel::Inactive,
                motion_intensity: 0.0,
                frame_start: 0,
                frame_end: 50,
            },
            ActivitySegment {
                start_time: 5.0,
                end_time: 10.0,
                activity_level: ActivityLevel::High,
                motion_intensity: 0.9,
                frame_start: 50,
                frame_end: 100,
            },
        ];
        let (sleep, active) = derive_periods(&segments, 30.0);
        assert!(sleep.is_empty(), "5s inactive run is below the 30s floor");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0], TimeRange { start: 5.0, end: 10.0 });
    }

    #[test]
    fn derive_periods_emits_sleep_period_meeting_threshold() {
        let segments = vec![ActivitySegment {
            start_time: 0.0,
            end_time: 40.0,
            activity_level: ActivityLevel::Inactive,
            motion_intensity: 0.0,
            frame_start: 0,
            frame_end: 400,
        }];
        let (sleep, active) = derive_periods(&segments, 30.0);
        assert_eq!(sleep, vec![TimeRange { start: 0.0, end: 40.0 }]);
        assert!(active.is_empty());
    }

    #[test]
    fn activity_ratio_is_active_time_over_duration() {
        let active = vec![TimeRange { start: 0.0, end: 3.0 }];
        assert!((activity_ratio(&active, 10.0) - 0.3).abs() < 1e-9);
    }
}
