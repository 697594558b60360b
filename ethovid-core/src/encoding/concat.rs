// ============================================================================
// ethovid-core/src/encoding/concat.rs
// ============================================================================
//
// CONCATENATION: Lossless Segment Stitching (component E, step 5)
//
// Stitches the per-segment clips a job produced into the final output via
// the ffmpeg demuxer-concat idiom (stream copy, no re-encode). Grounded on
// the teacher's `encoding::merger::SegmentMerger` (concat-list file,
// `-f concat -safe 0 -i <list> -c copy`), generalized from "merge
// pre-existing chapter files" to "merge the segments this job just
// encoded" and renamed to the spec's `ConcatFailure` error.
//
// AI-ASSISTANT-INFO: Lossless segment concatenation (component E)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CoreError, CoreResult};

/// Concatenates `segment_paths`, in order, into `output_path` using the
/// ffmpeg concat demuxer with stream copy. Writes a scratch concat-list
/// file inside `scratch_dir`.
pub fn concat_segments(
    segment_paths: &[PathBuf],
    output_path: &Path,
    scratch_dir: &Path,
) -> CoreResult<()> {
    if segment_paths.is_empty() {
        return Err(CoreError::ConcatFailure(
            "no segments to concatenate".to_string(),
        ));
    }

    let list_path = scratch_dir.join("concat_list.txt");
    write_concat_list(&list_path, segment_paths)?;

    let output = Command::new("ffmpeg")
        .args(["-f", "concat", "-safe", "0"])
        .arg("-i")
        .arg(&list_path)
        .args(["-c", "copy", "-y"])
        .arg(output_path)
        .output()
        .map_err(|e| crate::error::command_start_error("ffmpeg (concat)", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(CoreError::ConcatFailure(stderr));
    }

    Ok(())
}

fn write_concat_list(list_path: &Path, segment_paths: &[PathBuf]) -> CoreResult<()> {
    let mut file = fs::File::create(list_path)?;
    for path in segment_paths {
        let escaped = path.to_string_lossy().replace('\'', "'\\''");
        writeln!(file, "file '{}'", escaped)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_concat_list_quotes_each_path() {
        let dir = tempdir().unwrap();
        let list_path = dir.path().join("list.txt");
        let segments = vec![dir.path().join("segment_0000.mp4"), dir.path().join("segment_0001.mp4")];
        write_concat_list(&list_path, &segments).unwrap();

        let contents = fs::read_to_string(&list_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|l| l.starts_with("file '") && l.ends_with('\'')));
    }

    #[test]
    fn concat_rejects_empty_segment_list() {
        let dir = tempdir().unwrap();
        let err = concat_segments(&[], &dir.path().join("out.mp4"), dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConcatFailure(_)));
    }
}
