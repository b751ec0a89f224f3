//! ffprobe metadata adapter.
//!
//! Runs ffprobe with JSON output and extracts the fields the pipeline
//! cares about for the first video stream. No caching here: callers own
//! the cache (clips resolve metadata once per run).

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_media_model::StreamMetadata;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    codec_name: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe `path` with the given ffprobe binary.
pub fn probe_file(ffprobe_bin: &str, path: &Path) -> ReelforgeResult<StreamMetadata> {
    let output = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,codec_name,r_frame_rate,duration",
            "-show_entries",
            "format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelforgeError::probe(path, format!("failed to start {ffprobe_bin}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelforgeError::probe(
            path,
            format!("{ffprobe_bin} exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    parse_probe_output(path, &output.stdout)
}

/// Parse raw ffprobe JSON into stream metadata.
///
/// Split out from the subprocess call so parsing is testable without a
/// real binary.
pub(crate) fn parse_probe_output(path: &Path, raw: &[u8]) -> ReelforgeResult<StreamMetadata> {
    let parsed: FfprobeOutput = serde_json::from_slice(raw)
        .map_err(|e| ReelforgeError::probe(path, format!("unparsable probe output: {e}")))?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| ReelforgeError::probe(path, "no video stream"))?;

    let width = stream
        .width
        .ok_or_else(|| ReelforgeError::probe(path, "video stream has no width"))?;
    let height = stream
        .height
        .ok_or_else(|| ReelforgeError::probe(path, "video stream has no height"))?;
    let codec = stream
        .codec_name
        .clone()
        .ok_or_else(|| ReelforgeError::probe(path, "video stream has no codec name"))?;
    let fps = stream
        .r_frame_rate
        .clone()
        .ok_or_else(|| ReelforgeError::probe(path, "video stream has no frame rate"))?;

    // Matroska streams often carry no per-stream duration; fall back to
    // the container duration.
    let duration_secs = stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            parsed
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse::<f64>().ok())
        })
        .ok_or_else(|| ReelforgeError::probe(path, "no duration in stream or container"))?;

    Ok(StreamMetadata {
        width,
        height,
        codec,
        fps,
        duration_secs,
    })
}
