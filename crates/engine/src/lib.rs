//! ReelForge Engine
//!
//! Adapter layer over the external media engine. The rest of the system
//! talks to the [`MediaEngine`] trait only: one probe capability and one
//! run-a-transcode capability. The production implementation shells out to
//! ffmpeg/ffprobe; tests inject fakes.
//!
//! The engine contract is deliberately thin: a [`TranscodeJob`] carries
//! input paths, an optional filter-graph expression, output options, and
//! exactly one output path. The caller depends only on the terminal
//! success/failure signal and on the output artifact existing afterwards;
//! progress reports are observability-only.

use std::fmt;
use std::path::{Path, PathBuf};

use reelforge_common::ReelforgeResult;
use reelforge_media_model::{OperationKind, StreamMetadata};

pub mod ffmpeg;
pub mod probe;

pub use ffmpeg::FfmpegEngine;

/// Progress callback for engine runs.
pub type ProgressCallback = Box<dyn Fn(TranscodeProgress) + Send + Sync>;

/// Progress report emitted while a transcode runs.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeProgress {
    /// Completion fraction [0.0, 1.0], derived from the job's expected
    /// duration when known.
    pub percent: f64,

    /// Output timestamp reached so far, in seconds.
    pub out_time_secs: f64,

    /// Whether the engine reported the terminal progress record.
    pub done: bool,
}

/// One input file plus the engine options that precede it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInput {
    /// Options inserted before this input (e.g. demuxer selection).
    pub options: Vec<String>,

    /// Input file path.
    pub path: PathBuf,
}

impl JobInput {
    pub fn plain(path: impl Into<PathBuf>) -> Self {
        Self {
            options: Vec::new(),
            path: path.into(),
        }
    }

    pub fn with_options(options: Vec<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            options,
            path: path.into(),
        }
    }
}

/// A single engine invocation: inputs, an optional filter graph, output
/// options, and one output path.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    /// Operation this invocation implements, for logs and error labels.
    pub kind: OperationKind,

    /// Inputs in graph order.
    pub inputs: Vec<JobInput>,

    /// Filter-graph expression, when the operation needs one.
    pub filter: Option<String>,

    /// Stream mapping and output options, in order.
    pub output_args: Vec<String>,

    /// Output artifact path.
    pub output: PathBuf,

    /// Expected output duration, used only to scale progress reports.
    pub expected_duration_secs: Option<f64>,
}

impl TranscodeJob {
    /// Full engine argument list for this job.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
        ];

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.display().to_string());
        }

        if let Some(filter) = &self.filter {
            args.push("-filter_complex".to_string());
            args.push(filter.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.display().to_string());
        args
    }
}

impl fmt::Display for TranscodeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} input(s) -> {})",
            self.kind,
            self.inputs.len(),
            self.output.display()
        )
    }
}

/// Capability interface to the external media engine.
pub trait MediaEngine: Send + Sync {
    /// Return metadata for the first video stream of `path`.
    fn probe(&self, path: &Path) -> ReelforgeResult<StreamMetadata>;

    /// Execute one transcode invocation to completion.
    fn run(&self, job: &TranscodeJob, progress: Option<&ProgressCallback>) -> ReelforgeResult<()>;

    /// Check if this engine is available on the system.
    fn is_available(&self) -> bool;

    /// Engine name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_args_order_inputs_filter_then_output() {
        let job = TranscodeJob {
            kind: OperationKind::Overlay,
            inputs: vec![JobInput::plain("/in/bg.mp4"), JobInput::plain("/in/ovl.mp4")],
            filter: Some("[0:v][1:v]overlay[v]".to_string()),
            output_args: vec!["-map".to_string(), "[v]".to_string()],
            output: PathBuf::from("/out/composited.mp4"),
            expected_duration_secs: Some(60.0),
        };

        let args = job.to_args();
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -hide_banner -loglevel error -nostats -progress pipe:1"));
        assert!(joined.contains("-i /in/bg.mp4 -i /in/ovl.mp4"));
        assert!(joined.contains("-filter_complex [0:v][1:v]overlay[v] -map [v]"));
        assert!(joined.ends_with("/out/composited.mp4"));
    }

    #[test]
    fn input_options_precede_their_input() {
        let job = TranscodeJob {
            kind: OperationKind::Concat,
            inputs: vec![JobInput::with_options(
                vec!["-f".to_string(), "concat".to_string(), "-safe".to_string(), "0".to_string()],
                "/work/list.txt",
            )],
            filter: None,
            output_args: vec!["-c".to_string(), "copy".to_string()],
            output: PathBuf::from("/out/joined.mp4"),
            expected_duration_secs: None,
        };

        let joined = job.to_args().join(" ");
        assert!(joined.contains("-f concat -safe 0 -i /work/list.txt -c copy"));
    }
}
