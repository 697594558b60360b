// ============================================================================
// ethovid-core/src/external/mocks.rs
// ============================================================================
//
// TEST MOCKS: In-memory Stand-ins for opencv/ffmpeg/ffprobe
//
// Gated behind the `test-mocks` feature so production builds never link
// this code. Grounded on the teacher's `external::mocks` module: a
// `MockFfmpegSpawner` that matches expected argument substrings and a
// `MockFfprobeExecutor` keyed by path, generalized here with a
// `MockFrameSource` that replays a canned intensity timeline instead of
// decoding a real container, so the analyzer's seed scenarios run without
// opencv or a real ffmpeg binary.
//
// AI-ASSISTANT-INFO: opencv/ffmpeg/ffprobe mocks for the `test-mocks` feature

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;

use crate::encoding::{FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreError, CoreResult};
use crate::external::ffprobe::{FfprobeExecutor, VideoProperties};
use crate::motion::{DecodedFrame, FrameComponents, FrameIntensityComputer, FrameSource};

/// Replays a fixed sequence of frames with caller-supplied combined
/// intensity values already baked into `bg_ratio` (the companion
/// `MockIntensityComputer` below just echoes per-frame components back).
pub struct MockFrameSource {
    fps: f64,
    width: u32,
    height: u32,
    frames_total: u64,
    cursor: usize,
    /// One `bg_ratio` entry per frame; `of_intensity`/`fd_ratio` are zero.
    pub intensities: Vec<f64>,
}

impl MockFrameSource {
    pub fn new(fps: f64, width: u32, height: u32, intensities: Vec<f64>) -> Self {
        let frames_total = intensities.len() as u64;
        Self {
            fps,
            width,
            height,
            frames_total,
            cursor: 0,
            intensities,
        }
    }
}

impl FrameSource for MockFrameSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.frames_total
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn codec_tag(&self) -> String {
        "mock".to_string()
    }

    fn next_frame(&mut self) -> CoreResult<Option<DecodedFrame>> {
        if self.cursor >= self.intensities.len() {
            return Ok(None);
        }
        let area = (self.width as usize) * (self.height as usize);
        let frame = DecodedFrame::new(self.width, self.height, vec![0u8; area]);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn seek_to_time(&mut self, seconds: f64) -> CoreResult<()> {
        self.cursor = (seconds * self.fps).round().max(0.0) as usize;
        Ok(())
    }
}

/// Companion to `MockFrameSource`: returns the next canned intensity value
/// as `bg_ratio`, with `of_intensity`/`fd_ratio` at zero so the fused
/// intensity (with default weights) equals `bg_ratio * bg_weight`. Tests
/// that need an exact combined intensity should set `bg_weight = 1.0`.
pub struct MockIntensityComputer {
    values: std::vec::IntoIter<f64>,
}

impl MockIntensityComputer {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }
}

impl FrameIntensityComputer for MockIntensityComputer {
    fn compute(&mut self, _frame: &DecodedFrame) -> CoreResult<FrameComponents> {
        let bg_ratio = self.values.next().unwrap_or(0.0);
        Ok(FrameComponents {
            bg_ratio,
            of_intensity: 0.0,
            fd_ratio: 0.0,
        })
    }
}

/// Keyed by an input path substring expected in `-i <path>`. Each expected
/// invocation yields a scripted sequence of events followed by an exit
/// status.
#[derive(Clone)]
pub struct ScriptedInvocation {
    pub arg_pattern: String,
    pub events: Vec<FfmpegEvent>,
    pub exit_success: bool,
}

#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    scripted: Arc<Mutex<Vec<ScriptedInvocation>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, arg_pattern: impl Into<String>, events: Vec<FfmpegEvent>, exit_success: bool) {
        self.scripted.lock().unwrap().push(ScriptedInvocation {
            arg_pattern: arg_pattern.into(),
            events,
            exit_success,
        });
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        let joined = args.join(" ");

        let mut scripted = self.scripted.lock().unwrap();
        let position = scripted
            .iter()
            .position(|s| joined.contains(&s.arg_pattern))
            .ok_or_else(|| CoreError::EncoderFailure(format!("no scripted invocation matches args: {joined}")))?;
        let invocation = scripted.remove(position);

        Ok(MockFfmpegProcess {
            events: invocation.events.into_iter(),
            exit_success: invocation.exit_success,
        })
    }
}

pub struct MockFfmpegProcess {
    events: std::vec::IntoIter<FfmpegEvent>,
    exit_success: bool,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events.by_ref() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<std::process::ExitStatus> {
        Ok(exit_status(self.exit_success))
    }
}

#[cfg(unix)]
fn exit_status(success: bool) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(if success { 0 } else { 1 })
}

#[cfg(not(unix))]
fn exit_status(success: bool) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(if success { 0 } else { 1 })
}

/// Keyed by exact input path; returns a scripted result (`Ok` or `Err`) per path.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    expectations: Arc<Mutex<HashMap<PathBuf, VideoProperties>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, path: impl Into<PathBuf>, properties: VideoProperties) {
        self.expectations.lock().unwrap().insert(path.into(), properties);
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        self.expectations
            .lock()
            .unwrap()
            .get(input_path)
            .copied()
            .ok_or_else(|| CoreError::SourceOpenError {
                path: input_path.display().to_string(),
                reason: "no scripted ffprobe expectation".to_string(),
            })
    }
}
