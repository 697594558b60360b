// ============================================================================
// ethovid-core/src/compressor/adaptive.rs
// ============================================================================
//
// ADAPTIVE COMPRESSOR: Orchestrates Analyzer + Profile + Encoder (component E)
//
// Grounded on `original_source/backend/compression/adaptive_compressor.py`'s
// `AdaptiveCompressor.compress` method: the 20/70/10 progress-bar split
// (analysis / per-segment encode / concat), the degenerate
// zero-segment fallback onto the profile's `medium` settings, and
// cooperative cancellation checked only at stage and segment boundaries.
//
// AI-ASSISTANT-INFO: Adaptive compressor (component E)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;

use crate::compressor::job::{JobRecord, JobStatus};
use crate::config::CoreConfig;
use crate::encoding::FfmpegSpawner;
use crate::error::{CoreError, CoreResult};
use crate::motion::{self, ActivitySegment, FrameIntensityComputer, FrameSource, MotionAnalysisResult};
use crate::profiles::ProfileRegistry;
use crate::progress::ProgressBus;

/// The fraction of a segment's mean intensity above which ROI mode applies
/// a CRF discount, per the profile registry's ROI adjustment rule.
const ROI_INTENSITY_THRESHOLD: f64 = 0.02;

type FrameSourceFactory = dyn Fn(&Path) -> CoreResult<Box<dyn FrameSource + Send>> + Send + Sync;
type IntensityFactory = dyn Fn() -> CoreResult<Box<dyn FrameIntensityComputer + Send>> + Send + Sync;

/// Orchestrates one job end to end: analyze, plan segments via the profile
/// registry, encode each segment, concatenate, and report progress.
/// Generic over the encoder-spawning backend so tests can substitute a
/// `MockFfmpegSpawner`.
pub struct AdaptiveCompressor<S: FfmpegSpawner> {
    config: CoreConfig,
    profiles: Arc<ProfileRegistry>,
    progress_bus: ProgressBus,
    spawner: S,
    frame_source_factory: Arc<FrameSourceFactory>,
    intensity_factory: Arc<IntensityFactory>,
    jobs: Arc<Mutex<HashMap<String, JobRecord>>>,
    cancel_flags: Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>,
}

impl<S> Clone for AdaptiveCompressor<S>
where
    S: FfmpegSpawner + Clone,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            profiles: self.profiles.clone(),
            progress_bus: self.progress_bus.clone(),
            spawner: self.spawner.clone(),
            frame_source_factory: self.frame_source_factory.clone(),
            intensity_factory: self.intensity_factory.clone(),
            jobs: self.jobs.clone(),
            cancel_flags: self.cancel_flags.clone(),
        }
    }
}

impl<S> AdaptiveCompressor<S>
where
    S: FfmpegSpawner + Clone + Send + Sync + 'static,
    S::Process: Send,
{
    pub fn new(
        config: CoreConfig,
        profiles: Arc<ProfileRegistry>,
        progress_bus: ProgressBus,
        spawner: S,
        frame_source_factory: Arc<FrameSourceFactory>,
        intensity_factory: Arc<IntensityFactory>,
    ) -> Self {
        Self {
            config,
            profiles,
            progress_bus,
            spawner,
            frame_source_factory,
            intensity_factory,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            cancel_flags: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Validates `profile_name` up front (scenario 6: an unknown profile must
    /// fail before any job record exists or any event is emitted), then
    /// kicks off background work and returns immediately with the job's
    /// initial (pending) snapshot.
    pub fn start_job(
        &self,
        id: impl Into<String>,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        profile_name: impl Into<String>,
        roi_enabled: bool,
        batch_id: Option<String>,
    ) -> CoreResult<JobRecord> {
        let id = id.into();
        let input_path = input_path.into();
        let output_path = output_path.into();
        let profile_name = profile_name.into();

        let profile = self.profiles.get(&profile_name)?;

        let mut record = JobRecord::new(&id, input_path.to_string_lossy(), output_path.to_string_lossy(), &profile_name, roi_enabled);
        record.batch_id = batch_id;
        self.jobs.lock().expect("jobs lock poisoned").insert(id.clone(), record.clone());

        let cancel_flag = Arc::new(AtomicBool::new(false));
        self.cancel_flags
            .lock()
            .expect("cancel flags lock poisoned")
            .insert(id.clone(), cancel_flag.clone());

        let worker = self.clone();
        let job_id = id.clone();
        std::thread::spawn(move || {
            worker.run_job(job_id, input_path, output_path, profile_name, profile, roi_enabled, cancel_flag);
        });

        Ok(record)
    }

    pub fn status(&self, id: &str) -> Option<JobRecord> {
        self.jobs.lock().expect("jobs lock poisoned").get(id).cloned()
    }

    /// Exposes the shared progress bus so callers outside the compressor
    /// (e.g. the orchestrator cancelling a job still in its pending queue)
    /// can emit events for jobs that never reached `start_job`.
    pub fn progress_bus(&self) -> &ProgressBus {
        &self.progress_bus
    }

    /// Snapshot of every job the compressor has ever started (any status).
    pub fn list_all(&self) -> Vec<JobRecord> {
        self.jobs.lock().expect("jobs lock poisoned").values().cloned().collect()
    }

    /// Marks a running/pending job cancelled-on-next-boundary. Returns
    /// `false` if the job is unknown or already terminal.
    pub fn cancel(&self, id: &str) -> bool {
        let jobs = self.jobs.lock().expect("jobs lock poisoned");
        match jobs.get(id) {
            Some(job) if !job.status.is_terminal() => {
                if let Some(flag) = self.cancel_flags.lock().expect("cancel flags lock poisoned").get(id) {
                    flag.store(true, Ordering::SeqCst);
                }
                true
            }
            _ => false,
        }
    }

    fn update_job<F: FnOnce(&mut JobRecord)>(&self, id: &str, f: F) {
        if let Some(job) = self.jobs.lock().expect("jobs lock poisoned").get_mut(id) {
            f(job);
        }
    }

    fn run_job(
        &self,
        id: String,
        input_path: PathBuf,
        output_path: PathBuf,
        profile_name: String,
        profile: crate::profiles::ActivityProfile,
        roi_enabled: bool,
        cancel_flag: Arc<AtomicBool>,
    ) {
        self.update_job(&id, |j| {
            let _ = j.transition_to(JobStatus::Queued);
            let _ = j.transition_to(JobStatus::Running);
            j.stage = "starting".to_string();
        });
        self.progress_bus.register(&id, "starting");

        let original_size = fs::metadata(&input_path).ok().map(|m| m.len());
        self.update_job(&id, |j| j.original_size_bytes = original_size);

        match self.run_job_inner(&id, &input_path, &output_path, &profile_name, &profile, roi_enabled, &cancel_flag) {
            Ok(()) => {}
            Err(e) => {
                let message = format!("{e}");
                self.update_job(&id, |j| {
                    let _ = j.transition_to(JobStatus::Failed);
                    j.error_message = Some(message.clone());
                });
                let _ = fs::remove_file(&output_path);
                self.progress_bus.fail(&id, message, None);
            }
        }

        let segment_dir = self.config.output_dir.join("segments").join(&id);
        let _ = fs::remove_dir_all(&segment_dir);
    }

    fn check_cancelled(&self, id: &str, cancel_flag: &AtomicBool, output_path: &Path) -> bool {
        if !cancel_flag.load(Ordering::SeqCst) {
            return false;
        }
        self.update_job(id, |j| {
            let _ = j.transition_to(JobStatus::Cancelled);
        });
        let _ = fs::remove_file(output_path);
        self.progress_bus.cancel(id, Some("cancelled by caller".to_string()));
        true
    }

    fn run_job_inner(
        &self,
        id: &str,
        input_path: &Path,
        output_path: &Path,
        profile_name: &str,
        profile: &crate::profiles::ActivityProfile,
        roi_enabled: bool,
        cancel_flag: &Arc<AtomicBool>,
    ) -> CoreResult<()> {
        if self.check_cancelled(id, cancel_flag, output_path) {
            return Ok(());
        }

        let mut source = (self.frame_source_factory)(input_path)?;
        let mut intensity_computer = (self.intensity_factory)()?;

        let bus = self.progress_bus.clone();
        let id_owned = id.to_string();
        let analysis_progress = move |percent: f64, stage: &str| {
            bus.update(id_owned.clone(), percent * 0.2, Some(format!("analyzing:{stage}")), None, None);
        };

        let result = motion::analyze(source.as_mut(), intensity_computer.as_mut(), &self.config, &analysis_progress)?;
        self.write_analysis_report(id, &result)?;

        if self.check_cancelled(id, cancel_flag, output_path) {
            return Ok(());
        }

        let segment_dir = self.config.output_dir.join("segments").join(id);
        fs::create_dir_all(&segment_dir)?;

        let segment_paths = if result.activity_segments.is_empty() {
            self.encode_degenerate(id, input_path, &segment_dir, profile)?
        } else {
            self.encode_segments(id, input_path, &segment_dir, profile, roi_enabled, &result.activity_segments, cancel_flag, output_path)?
        };

        let Some(segment_paths) = segment_paths else {
            return Ok(()); // cancelled mid-segment-loop
        };

        self.update_job(id, |j| j.stage = "concatenating".to_string());
        self.progress_bus.update(id, 90.0, Some("concatenating".to_string()), None, None);

        crate::encoding::concat_segments(&segment_paths, output_path, &self.config.temp_dir)?;
        let _ = fs::remove_dir_all(&segment_dir);

        let compressed_size = fs::metadata(output_path).ok().map(|m| m.len());
        self.update_job(id, |j| {
            let _ = j.transition_to(JobStatus::Completed);
            j.compressed_size_bytes = compressed_size;
            j.progress_percent = 100.0;
            j.stage = "completed".to_string();
        });
        self.progress_bus.complete(id, None);

        let _ = profile_name;
        Ok(())
    }

    /// Zero-segment fallback: encode the whole input once with the
    /// profile's `medium` settings. Progress = 20 + encoder_progress*0.7.
    fn encode_degenerate(
        &self,
        id: &str,
        input_path: &Path,
        segment_dir: &Path,
        profile: &crate::profiles::ActivityProfile,
    ) -> CoreResult<Option<Vec<PathBuf>>> {
        self.update_job(id, |j| j.stage = "encoding:degenerate_single_segment".to_string());
        let settings = profile.settings_for(crate::motion::ActivityLevel::Medium);
        let segment_path = segment_dir.join("segment_0000.mp4");

        let bus = self.progress_bus.clone();
        let id_owned = id.to_string();
        let on_progress = move |percent: f64| {
            bus.update(id_owned.clone(), 20.0 + percent * 0.7, Some("encoding:degenerate_single_segment".to_string()), None, None);
        };

        crate::encoding::encode(&self.spawner, input_path, &segment_path, &settings, 0.0, None, &on_progress)?;
        Ok(Some(vec![segment_path]))
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_segments(
        &self,
        id: &str,
        input_path: &Path,
        segment_dir: &Path,
        profile: &crate::profiles::ActivityProfile,
        roi_enabled: bool,
        segments: &[ActivitySegment],
        cancel_flag: &Arc<AtomicBool>,
        output_path: &Path,
    ) -> CoreResult<Option<Vec<PathBuf>>> {
        let total = segments.len();
        self.update_job(id, |j| j.segments_total = total as u32);

        let mut segment_paths = Vec::with_capacity(total);

        for (i, segment) in segments.iter().enumerate() {
            if self.check_cancelled(id, cancel_flag, output_path) {
                return Ok(None);
            }

            self.update_job(id, |j| {
                j.segments_current = i as u32;
                j.stage = format!("encoding:segment_{i}");
            });

            let base_settings = profile.settings_for(segment.activity_level);
            let settings = if roi_enabled && segment.motion_intensity > ROI_INTENSITY_THRESHOLD {
                base_settings.roi_adjusted()
            } else {
                base_settings
            };

            let segment_path = segment_dir.join(format!("segment_{i:04}.mp4"));
            let duration = segment.duration();

            let slice_start = 20.0 + (i as f64 / total as f64) * 70.0;
            let slice_end = 20.0 + ((i + 1) as f64 / total as f64) * 70.0;
            let bus = self.progress_bus.clone();
            let id_owned = id.to_string();
            let stage_label = format!("encoding:segment_{i}");
            let on_progress = move |percent: f64| {
                let mapped = slice_start + (percent / 100.0) * (slice_end - slice_start);
                bus.update(id_owned.clone(), mapped, Some(stage_label.clone()), None, None);
            };

            crate::encoding::encode(&self.spawner, input_path, &segment_path, &settings, segment.start_time, Some(duration), &on_progress)?;
            segment_paths.push(segment_path);
        }

        self.update_job(id, |j| j.segments_current = total as u32);
        Ok(Some(segment_paths))
    }

    fn write_analysis_report(&self, id: &str, result: &MotionAnalysisResult) -> CoreResult<()> {
        #[derive(Serialize)]
        struct AnalysisReport<'a> {
            total_duration: f64,
            total_frames: u64,
            fps: f64,
            activity_segments: &'a [ActivitySegment],
            motion_timeline: &'a [f64],
            sleep_periods: Vec<(f64, f64)>,
            active_periods: Vec<(f64, f64)>,
            overall_activity_ratio: f64,
            analysis_timestamp: chrono::DateTime<Utc>,
        }

        let report = AnalysisReport {
            total_duration: result.total_duration,
            total_frames: result.total_frames,
            fps: result.fps,
            activity_segments: &result.activity_segments,
            motion_timeline: &result.motion_timeline,
            sleep_periods: result.sleep_periods.iter().map(|r| (r.start, r.end)).collect(),
            active_periods: result.active_periods.iter().map(|r| (r.start, r.end)).collect(),
            overall_activity_ratio: result.overall_activity_ratio,
            analysis_timestamp: result.analysis_timestamp,
        };

        let report_dir = self.config.output_dir.join("analysis").join(id);
        fs::create_dir_all(&report_dir)?;
        let report_path = report_dir.join("analysis_report.json");
        let json = serde_json::to_string_pretty(&report).map_err(|e| CoreError::JsonError(e.to_string()))?;
        fs::write(report_path, json)?;
        Ok(())
    }
}
