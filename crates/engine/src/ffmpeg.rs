//! ffmpeg subprocess driver.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_media_model::StreamMetadata;

use crate::probe::probe_file;
use crate::{MediaEngine, ProgressCallback, TranscodeJob, TranscodeProgress};

/// Production engine: ffmpeg for transcodes, ffprobe for metadata.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit binary paths instead of resolving from PATH.
    pub fn with_binaries(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe(&self, path: &Path) -> ReelforgeResult<StreamMetadata> {
        probe_file(&self.ffprobe_bin, path)
    }

    fn run(&self, job: &TranscodeJob, progress: Option<&ProgressCallback>) -> ReelforgeResult<()> {
        let args = job.to_args();
        tracing::debug!(kind = %job.kind, ?args, "Running ffmpeg");

        let operation = job.kind.to_string();
        let mut child = Command::new(&self.ffmpeg_bin)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelforgeError::engine(&operation, format!("failed to start ffmpeg: {e}"))
            })?;

        tracing::info!(
            kind = %job.kind,
            pid = child.id(),
            output = %job.output.display(),
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelforgeError::engine(&operation, "failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelforgeError::engine(&operation, "failed to capture stderr"))?;

        // Drain stderr concurrently to avoid ffmpeg blocking on a full
        // stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();

        loop {
            line.clear();
            let bytes = reader.read_line(&mut line).map_err(|e| {
                ReelforgeError::engine(&operation, format!("failed reading progress: {e}"))
            })?;
            if bytes == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some((key, value)) = trimmed.split_once('=') {
                state.update(key, value);
                if key == "progress" {
                    if let Some(cb) = progress {
                        cb(state.report(job.expected_duration_secs));
                    }
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| ReelforgeError::engine(&operation, format!("failed to wait: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(ReelforgeError::engine(
                &operation,
                format!("ffmpeg failed (status {}): {}", status, stderr_output.trim()),
            ));
        }

        // The terminal signal alone is not enough: the contract is that a
        // successful run leaves the artifact on disk.
        if !job.output.exists() {
            return Err(ReelforgeError::engine(
                &operation,
                format!("ffmpeg succeeded but produced no artifact at {}", job.output.display()),
            ));
        }

        tracing::info!(kind = %job.kind, output = %job.output.display(), "ffmpeg run complete");
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg_bin) && command_exists(&self.ffprobe_bin)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Accumulated `-progress pipe:1` key=value state.
#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" => {
                if let Ok(ms) = value.parse::<f64>() {
                    self.out_time_secs = ms / 1_000_000.0;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    fn report(&self, expected_duration_secs: Option<f64>) -> TranscodeProgress {
        let percent = match expected_duration_secs {
            Some(expected) if expected > 0.0 => (self.out_time_secs / expected).clamp(0.0, 1.0),
            _ => 0.0,
        };

        TranscodeProgress {
            percent: if self.complete { 1.0 } else { percent },
            out_time_secs: self.out_time_secs,
            done: self.complete,
        }
    }
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
