// ============================================================================
// ethovid-core/tests/compressor_adaptive.rs
// ============================================================================
//
// Integration tests for `AdaptiveCompressor` driven entirely through mocks:
// a scripted `MockFfmpegSpawner` stands in for the encoder, so these assert
// on segment planning and progress reporting without needing a real input
// file or ffmpeg binary for the encode step. Segment concatenation still
// shells out to a real `ffmpeg` binary (see `encoding::concat_segments`),
// so the terminal status is not asserted here -- only that every planned
// segment actually reached the encoder.
//
// AI-ASSISTANT-INFO: integration tests for the adaptive compressor

#![cfg(feature = "test-mocks")]

use std::sync::Arc;
use std::time::Duration;

use ethovid_core::compressor::AdaptiveCompressor;
use ethovid_core::config::CoreConfigBuilder;
use ethovid_core::external::mocks::{MockFfmpegSpawner, MockFrameSource, MockIntensityComputer};
use ethovid_core::progress::ProgressBus;
use ethovid_core::ProfileRegistry;

fn wait_for<F: Fn() -> bool>(predicate: F) {
    for _ in 0..400 {
        if predicate() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition not met within timeout");
}

#[test]
fn high_activity_timeline_is_segmented_and_every_segment_reaches_the_encoder() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .output_dir(temp.path().to_path_buf())
        .temp_dir(temp.path().to_path_buf())
        .max_segment_seconds(1.0)
        .min_inactive_duration(100.0) // keep the whole clip in one active run
        .build();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();
    let spawner = MockFfmpegSpawner::new();
    // Every segment's ffmpeg invocation names the input path; scripting one
    // catch-all success per expected segment is enough since the mock
    // matches by substring and pops on use.
    for _ in 0..10 {
        spawner.expect("input.mp4", Vec::new(), true);
    }

    let compressor = AdaptiveCompressor::new(
        config,
        profiles.clone(),
        bus.clone(),
        spawner.clone(),
        Arc::new(|_path: &std::path::Path| {
            // 10 seconds at 10fps, constant high intensity -> one active segment.
            Ok(Box::new(MockFrameSource::new(10.0, 64, 48, vec![0.5; 100])) as Box<_>)
        }),
        Arc::new(|| Ok(Box::new(MockIntensityComputer::new(vec![0.5; 100])) as Box<_>)),
    );

    compressor
        .start_job("job-seg", "input.mp4", temp.path().join("out.mp4"), "balanced", false, None)
        .unwrap();

    wait_for(|| {
        compressor
            .status("job-seg")
            .map(|j| j.stage == "concatenating" || j.status.is_terminal())
            .unwrap_or(false)
    });

    let job = compressor.status("job-seg").unwrap();
    assert!(job.segments_total >= 1);
    assert_eq!(job.segments_current, job.segments_total);
}

#[test]
fn varying_activity_timeline_is_split_into_distinct_segments_through_the_real_analyzer() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .output_dir(temp.path().to_path_buf())
        .temp_dir(temp.path().to_path_buf())
        .max_segment_seconds(100.0) // don't let the cap split segments on its own
        .min_inactive_duration(1.0)
        .build();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();
    let spawner = MockFfmpegSpawner::new();
    // One scripted encode per expected segment: high activity, then inactive.
    spawner.expect("input.mp4", Vec::new(), true);
    spawner.expect("input.mp4", Vec::new(), true);

    // bg_ratio 0.3 with the default bg_weight (0.5) combines to 0.15, above
    // the default high threshold (0.08); bg_ratio 0.0 combines to 0.0, below
    // the default low threshold (0.01). This drives the real `motion::analyze`
    // pipeline (not a canned `ActivitySegment` list) through two distinct
    // activity levels.
    let mut intensities = vec![0.3; 50];
    intensities.extend(vec![0.0; 50]);

    let compressor = AdaptiveCompressor::new(
        config,
        profiles.clone(),
        bus.clone(),
        spawner.clone(),
        Arc::new({
            let intensities = intensities.clone();
            move |_path: &std::path::Path| Ok(Box::new(MockFrameSource::new(10.0, 64, 48, intensities.clone())) as Box<_>)
        }),
        Arc::new(move || Ok(Box::new(MockIntensityComputer::new(intensities.clone())) as Box<_>)),
    );

    compressor
        .start_job("job-varying", "input.mp4", temp.path().join("out.mp4"), "balanced", false, None)
        .unwrap();

    wait_for(|| {
        compressor
            .status("job-varying")
            .map(|j| j.stage == "concatenating" || j.status.is_terminal())
            .unwrap_or(false)
    });

    let job = compressor.status("job-varying").unwrap();
    assert_eq!(job.segments_total, 2);
    assert_eq!(job.segments_current, job.segments_total);

    let report_path = temp.path().join("analysis").join("job-varying").join("analysis_report.json");
    let report: serde_json::Value = serde_json::from_slice(&std::fs::read(report_path).expect("analysis report written")).unwrap();
    let segments = report["activity_segments"].as_array().expect("activity_segments array");
    assert_eq!(segments.len(), 2);
    assert_ne!(segments[0]["activity_level"], segments[1]["activity_level"]);
}

#[test]
fn unscripted_encoder_invocation_fails_the_job_without_panicking() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .output_dir(temp.path().to_path_buf())
        .temp_dir(temp.path().to_path_buf())
        .build();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();
    let spawner = MockFfmpegSpawner::new(); // nothing scripted

    let compressor = AdaptiveCompressor::new(
        config,
        profiles.clone(),
        bus,
        spawner,
        Arc::new(|_path: &std::path::Path| Ok(Box::new(MockFrameSource::new(10.0, 64, 48, vec![0.0; 10])) as Box<_>)),
        Arc::new(|| Ok(Box::new(MockIntensityComputer::new(vec![0.0; 10])) as Box<_>)),
    );

    compressor
        .start_job("job-fail", "input.mp4", temp.path().join("out.mp4"), "balanced", false, None)
        .unwrap();

    wait_for(|| compressor.status("job-fail").map(|j| j.status.is_terminal()).unwrap_or(false));
    let job = compressor.status("job-fail").unwrap();
    assert_eq!(job.status, ethovid_core::JobStatus::Failed);
    assert!(job.error_message.is_some());
}
