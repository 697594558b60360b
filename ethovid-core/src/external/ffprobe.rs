// ============================================================================
// ethovid-core/src/external/ffprobe.rs
// ============================================================================
//
// FFPROBE INTEGRATION: Source Duration/FPS/Resolution Probing
//
// Grounded on the teacher's `external::ffprobe_executor::{FfprobeExecutor,
// CrateFfprobeExecutor}`, same trait-based dependency-injection shape,
// narrowed to the properties the frame source and file-validation path need.
//
// AI-ASSISTANT-INFO: FFprobe execution abstraction

use std::path::Path;

use ffprobe::{ffprobe, FfProbeError};

use crate::error::{command_failed_error, command_start_error, CoreError, CoreResult};

/// Properties of a video file's primary stream, as reported by ffprobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub fps: f64,
    pub frame_count: u64,
}

/// Trait for executing ffprobe commands, allowing tests to substitute a mock.
pub trait FfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties>;
}

/// Production implementation backed by the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        let metadata = ffprobe(input_path).map_err(|e| map_ffprobe_error(e, "video properties"))?;

        let duration_secs = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| CoreError::SourceOpenError {
                path: input_path.display().to_string(),
                reason: "could not parse duration".to_string(),
            })?;

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| CoreError::SourceOpenError {
                path: input_path.display().to_string(),
                reason: "no video stream found".to_string(),
            })?;

        let width = video_stream.width.unwrap_or(0).max(0) as u32;
        let height = video_stream.height.unwrap_or(0).max(0) as u32;

        let fps = video_stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .unwrap_or(0.0);

        let frame_count = if fps > 0.0 {
            (duration_secs * fps).round() as u64
        } else {
            0
        };

        Ok(VideoProperties {
            width,
            height,
            duration_secs,
            fps,
            frame_count,
        })
    }
}

/// Parses ffprobe's `"30000/1001"`-style frame rate fraction.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let mut parts = raw.split('/');
    let num: f64 = parts.next()?.parse().ok()?;
    let den: f64 = parts.next().unwrap_or("1").parse().ok()?;
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        other => CoreError::SourceOpenError {
            path: String::new(),
            reason: format!("ffprobe ({context}) failed: {other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_frame_rate() {
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("not-a-rate"), None);
    }
}
