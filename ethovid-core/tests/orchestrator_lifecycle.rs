// ============================================================================
// ethovid-core/tests/orchestrator_lifecycle.rs
// ============================================================================
//
// Integration tests for `JobOrchestrator`: submission validation, priority
// ordering, batch all-or-nothing, and cancellation, exercised with mock
// backends so no opencv/ffmpeg binary is required.
//
// AI-ASSISTANT-INFO: integration tests for the job orchestrator

#![cfg(feature = "test-mocks")]

use std::path::PathBuf;
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use ethovid_core::compressor::AdaptiveCompressor;
use ethovid_core::config::CoreConfigBuilder;
use ethovid_core::error::CoreResult;
use ethovid_core::external::mocks::{MockFfmpegSpawner, MockFrameSource, MockIntensityComputer};
use ethovid_core::motion::{DecodedFrame, FrameSource};
use ethovid_core::orchestrator::{JobOrchestrator, JobPriority, SubmitRequest};
use ethovid_core::progress::{ProgressBus, ProgressEvent, ProgressEventType};
use ethovid_core::{CoreError, JobStatus, ProfileRegistry};

/// A `FrameSource` whose first `next_frame` call blocks forever on a
/// two-party barrier nothing else ever joins. Used to hold a worker busy on
/// one job indefinitely so a second, queued job is guaranteed to still be
/// sitting in the orchestrator's pending map when the test cancels it.
struct NeverFinishesFrameSource {
    barrier: Arc<Barrier>,
}

impl FrameSource for NeverFinishesFrameSource {
    fn fps(&self) -> f64 {
        10.0
    }
    fn frame_count(&self) -> u64 {
        10
    }
    fn width(&self) -> u32 {
        64
    }
    fn height(&self) -> u32 {
        48
    }
    fn codec_tag(&self) -> String {
        "blocking".to_string()
    }
    fn next_frame(&mut self) -> CoreResult<Option<DecodedFrame>> {
        self.barrier.wait();
        unreachable!("barrier is never completed by a second party")
    }
    fn seek_to_time(&mut self, _seconds: f64) -> CoreResult<()> {
        Ok(())
    }
}

/// Like `test_orchestrator`, but every job's frame source blocks forever on
/// its first frame, so a single worker never advances past whichever job it
/// dispatches first.
fn blocked_orchestrator(worker_pool_size: usize) -> (JobOrchestrator<MockFfmpegSpawner>, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .output_dir(temp.path().to_path_buf())
        .temp_dir(temp.path().to_path_buf())
        .worker_pool_size(worker_pool_size)
        .build();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();
    let spawner = MockFfmpegSpawner::new();

    let compressor = AdaptiveCompressor::new(
        config,
        profiles.clone(),
        bus,
        spawner,
        Arc::new(|_path: &std::path::Path| {
            Ok(Box::new(NeverFinishesFrameSource { barrier: Arc::new(Barrier::new(2)) }) as Box<_>)
        }),
        Arc::new(|| Ok(Box::new(MockIntensityComputer::new(Vec::new())) as Box<_>)),
    );

    (JobOrchestrator::new(compressor, profiles, worker_pool_size), temp)
}

fn test_orchestrator(worker_pool_size: usize) -> (JobOrchestrator<MockFfmpegSpawner>, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .output_dir(temp.path().to_path_buf())
        .temp_dir(temp.path().to_path_buf())
        .worker_pool_size(worker_pool_size)
        .build();

    let profiles = Arc::new(ProfileRegistry::new());
    let bus = ProgressBus::new();
    let spawner = MockFfmpegSpawner::new();

    let compressor = AdaptiveCompressor::new(
        config,
        profiles.clone(),
        bus,
        spawner,
        Arc::new(|_path: &std::path::Path| Ok(Box::new(MockFrameSource::new(10.0, 64, 48, vec![0.0; 20])) as Box<_>)),
        Arc::new(|| Ok(Box::new(MockIntensityComputer::new(vec![0.0; 20])) as Box<_>)),
    );

    (JobOrchestrator::new(compressor, profiles, worker_pool_size), temp)
}

fn wait_for<F: Fn() -> bool>(predicate: F) {
    for _ in 0..400 {
        if predicate() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition not met within timeout");
}

fn request(label: &str, priority: JobPriority) -> SubmitRequest {
    SubmitRequest {
        input_path: PathBuf::from(format!("/nonexistent/{label}.mp4")),
        output_path: PathBuf::from(format!("/nonexistent/{label}_out.mp4")),
        profile_name: "balanced".to_string(),
        roi_enabled: false,
        priority,
    }
}

#[test]
fn unknown_profile_is_rejected_before_any_record_exists() {
    let (orchestrator, _temp) = test_orchestrator(1);
    let mut bad = request("job", JobPriority::Normal);
    bad.profile_name = "does-not-exist".to_string();

    let err = orchestrator.submit(bad).unwrap_err();
    assert!(matches!(err, CoreError::UnknownProfile(_)));
    assert!(orchestrator.list_active().is_empty());
}

#[test]
fn batch_submission_is_all_or_nothing() {
    let (orchestrator, _temp) = test_orchestrator(1);
    let mut good = request("a", JobPriority::Normal);
    let mut bad = request("b", JobPriority::Normal);
    bad.profile_name = "unknown".to_string();
    good.priority = JobPriority::Low;

    let err = orchestrator.submit_batch(vec![good, bad]).unwrap_err();
    assert!(matches!(err, CoreError::UnknownProfile(_)));
    assert!(orchestrator.list_active().is_empty());
}

#[test]
fn cancelling_a_job_still_queued_behind_a_running_job_reports_cancelled_everywhere() {
    let (orchestrator, temp) = blocked_orchestrator(1);

    // The single worker picks this one up and blocks forever inside
    // `next_frame`, so it never becomes terminal and the worker never pops
    // the queue again.
    let blocker_output = temp.path().join("blocker_out.mp4");
    let mut blocker = request("blocker", JobPriority::Normal);
    blocker.output_path = blocker_output;
    let blocker_id = orchestrator.submit(blocker).unwrap();
    wait_for(|| orchestrator.status(&blocker_id).map(|j| j.status == JobStatus::Running).unwrap_or(false));

    let queued_output = temp.path().join("queued_out.mp4");
    let mut queued = request("queued", JobPriority::Normal);
    queued.output_path = queued_output.clone();
    let id = orchestrator.submit(queued).unwrap();

    // Still sitting in the pending map: the worker is permanently busy with
    // `blocker_id` and has not popped the queue a second time.
    assert!(orchestrator.list_active().contains_key(&id));

    let captured: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let captured_for_cb = captured.clone();
    let sub_id = orchestrator.progress_bus().subscribe(id.clone(), move |event| {
        captured_for_cb.lock().expect("captured events lock poisoned").push(event.clone());
    });

    assert!(orchestrator.cancel(&id));

    wait_for(|| {
        captured
            .lock()
            .expect("captured events lock poisoned")
            .iter()
            .any(|e| e.event_type == ProgressEventType::Cancelled)
    });
    orchestrator.progress_bus().unsubscribe(id.clone(), sub_id);

    let job = orchestrator.status(&id).expect("cancelled job record must still be queryable");
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(!queued_output.exists());
}

#[test]
fn unknown_job_id_cannot_be_cancelled() {
    let (orchestrator, _temp) = test_orchestrator(1);
    assert!(!orchestrator.cancel("does-not-exist"));
}

#[test]
fn a_single_worker_processes_jobs_one_at_a_time() {
    let (orchestrator, _temp) = test_orchestrator(1);
    let first = orchestrator.submit(request("first", JobPriority::Normal)).unwrap();
    let second = orchestrator.submit(request("second", JobPriority::Normal)).unwrap();

    wait_for(|| {
        let active = orchestrator.list_active();
        !active.contains_key(&first) || !active.contains_key(&second)
    });

    // Regardless of encode outcome (no real ffmpeg for concat in this
    // environment), both jobs eventually reach a terminal state and the
    // orchestrator never loses track of either.
    wait_for(|| {
        orchestrator.status(&first).map(|j| j.status.is_terminal()).unwrap_or(false)
            && orchestrator.status(&second).map(|j| j.status.is_terminal()).unwrap_or(false)
    });
}
