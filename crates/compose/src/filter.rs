//! Filter-graph construction.
//!
//! Turns declarative [`Operation`]s into concrete [`TranscodeJob`]s: the
//! filter-graph expression, stream maps, and output options for one engine
//! invocation. Every visual-output operation re-encodes to one fixed
//! codec/pixel-format pair so each artifact is a valid input to the next
//! operation.

use std::path::{Path, PathBuf};

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_media_model::{Operation, Resolution, ScaleMode, TimeWindow};
use reelforge_engine::{JobInput, TranscodeJob};

/// Fixed video codec for re-encoded artifacts.
pub const VIDEO_CODEC: &str = "libx264";

/// Fixed pixel format for re-encoded artifacts.
pub const PIXEL_FORMAT: &str = "yuv420p";

/// Fixed audio codec for muxed or carried audio.
pub const AUDIO_CODEC: &str = "aac";

fn encode_video_args() -> Vec<String> {
    vec![
        "-c:v".to_string(),
        VIDEO_CODEC.to_string(),
        "-pix_fmt".to_string(),
        PIXEL_FORMAT.to_string(),
    ]
}

fn scale_expr(target: Resolution, mode: ScaleMode) -> String {
    let Resolution { width, height } = target;
    match mode {
        ScaleMode::Stretch => format!("scale={width}:{height}"),
        ScaleMode::Pad => format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
        ),
    }
}

fn trim_expr(window: &TimeWindow) -> String {
    format!(
        "trim=start={}:duration={},setpts=PTS-STARTPTS",
        window.start_secs, window.duration_secs
    )
}

/// Build the engine invocation for one operation.
///
/// `inputs` are the resolved paths for `op.inputs()`, in the same order.
pub fn build_job(
    op: &Operation,
    inputs: &[PathBuf],
    output: PathBuf,
    expected_duration_secs: Option<f64>,
) -> ReelforgeResult<TranscodeJob> {
    let declared = op.inputs().len();
    if inputs.len() != declared {
        return Err(ReelforgeError::invalid_input(format!(
            "{} operation declares {declared} input(s) but {} were resolved",
            op.kind(),
            inputs.len()
        )));
    }

    let (filter, output_args) = match op {
        Operation::Trim {
            window, with_audio, ..
        } => {
            let mut graph = format!("[0:v]{}[v]", trim_expr(window));
            let mut args = vec!["-map".to_string(), "[v]".to_string()];
            if *with_audio {
                graph.push_str(&format!(
                    ";[0:a]atrim=start={}:duration={},asetpts=PTS-STARTPTS[a]",
                    window.start_secs, window.duration_secs
                ));
                args.push("-map".to_string());
                args.push("[a]".to_string());
                args.push("-c:a".to_string());
                args.push(AUDIO_CODEC.to_string());
            } else {
                args.push("-an".to_string());
            }
            args.extend(encode_video_args());
            (Some(graph), args)
        }

        Operation::Scale {
            target,
            mode,
            with_audio,
            ..
        } => {
            let graph = format!("[0:v]{}[v]", scale_expr(*target, *mode));
            let mut args = vec!["-map".to_string(), "[v]".to_string()];
            if *with_audio {
                args.push("-map".to_string());
                args.push("0:a?".to_string());
                args.push("-c:a".to_string());
                args.push(AUDIO_CODEC.to_string());
            } else {
                args.push("-an".to_string());
            }
            args.extend(encode_video_args());
            (Some(graph), args)
        }

        Operation::Concat {
            inputs: declared_inputs,
            target,
            with_audio,
            ..
        } => {
            if declared_inputs.is_empty() {
                return Err(ReelforgeError::invalid_input("concat requires at least one input"));
            }
            let n = declared_inputs.len();
            let mut graph = String::new();
            for i in 0..n {
                graph.push_str(&format!(
                    "[{i}:v]{}[v{i}];",
                    scale_expr(*target, ScaleMode::Stretch)
                ));
            }
            let mut args = vec!["-map".to_string(), "[v]".to_string()];
            if *with_audio {
                for i in 0..n {
                    graph.push_str(&format!("[v{i}][{i}:a]"));
                }
                graph.push_str(&format!("concat=n={n}:v=1:a=1[v][a]"));
                args.push("-map".to_string());
                args.push("[a]".to_string());
                args.push("-c:a".to_string());
                args.push(AUDIO_CODEC.to_string());
            } else {
                for i in 0..n {
                    graph.push_str(&format!("[v{i}]"));
                }
                graph.push_str(&format!("concat=n={n}:v=1:a=0[v]"));
            }
            args.extend(encode_video_args());
            (Some(graph), args)
        }

        Operation::Overlay { window, target, .. } => {
            // Overlay content starts from its own time zero and is only
            // visible inside the window on the background's timeline.
            let graph = format!(
                "[0:v]{scale}[bg];\
                 [1:v]trim=start=0:end={dur},setpts=PTS-STARTPTS,{scale}[ovl];\
                 [bg][ovl]overlay=enable='between(t,{start},{end})'[v]",
                scale = scale_expr(*target, ScaleMode::Stretch),
                dur = window.duration_secs,
                start = window.start_secs,
                end = window.end_secs(),
            );
            let mut args = vec![
                "-map".to_string(),
                "[v]".to_string(),
                // The background's own audio rides along until StripAudio.
                "-map".to_string(),
                "0:a?".to_string(),
                "-c:a".to_string(),
                AUDIO_CODEC.to_string(),
            ];
            args.extend(encode_video_args());
            (Some(graph), args)
        }

        Operation::StripAudio { .. } => {
            let mut args = vec!["-map".to_string(), "0:v".to_string(), "-an".to_string()];
            args.extend(encode_video_args());
            (None, args)
        }

        Operation::MuxAudio { .. } => {
            // Video copied untouched; audio re-encoded; `-shortest`
            // truncates the longer stream.
            let args = vec![
                "-map".to_string(),
                "0:v".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                AUDIO_CODEC.to_string(),
                "-shortest".to_string(),
            ];
            (None, args)
        }
    };

    Ok(TranscodeJob {
        kind: op.kind(),
        inputs: inputs.iter().map(JobInput::plain).collect(),
        filter,
        output_args,
        output,
        expected_duration_secs,
    })
}

/// Contents of a concat-demuxer list file.
pub fn concat_list_content(paths: &[PathBuf]) -> String {
    let mut content = String::new();
    for path in paths {
        let escaped = path.display().to_string().replace('\'', "'\\''");
        content.push_str(&format!("file '{escaped}'\n"));
    }
    content
}

/// Stream-copy concatenation via the concat demuxer.
///
/// Byte-preserving: no filter graph, no re-encode. Only valid for inputs
/// the compatibility verifier approved.
pub fn concat_copy_job(
    list_path: &Path,
    output: PathBuf,
    expected_duration_secs: Option<f64>,
) -> TranscodeJob {
    TranscodeJob {
        kind: reelforge_media_model::OperationKind::Concat,
        inputs: vec![JobInput::with_options(
            vec![
                "-f".to_string(),
                "concat".to_string(),
                "-safe".to_string(),
                "0".to_string(),
            ],
            list_path,
        )],
        filter: None,
        output_args: vec!["-c".to_string(), "copy".to_string()],
        output,
        expected_duration_secs,
    }
}
