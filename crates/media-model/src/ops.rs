//! Canonical transcoding operations.
//!
//! An operation declares its inputs (source clips or artifacts produced by
//! earlier operations), its parameters, and exactly one named output
//! artifact. Operations are data; the compose crate turns them into engine
//! invocations.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::{Resolution, ScaleMode, TimeWindow};

/// Input to an operation: a source clip path or a named artifact from an
/// earlier operation in the same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpInput {
    Clip(PathBuf),
    Artifact(String),
}

impl OpInput {
    pub fn clip(path: impl Into<PathBuf>) -> Self {
        Self::Clip(path.into())
    }

    pub fn artifact(name: impl Into<String>) -> Self {
        Self::Artifact(name.into())
    }
}

/// Operation discriminant, used for error labels and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Trim,
    Scale,
    Concat,
    Overlay,
    StripAudio,
    MuxAudio,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Trim => "trim",
            OperationKind::Scale => "scale",
            OperationKind::Concat => "concat",
            OperationKind::Overlay => "overlay",
            OperationKind::StripAudio => "strip-audio",
            OperationKind::MuxAudio => "mux-audio",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative transcoding unit with exactly one output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// Restrict the input to [start, start + duration), timestamps reset
    /// to zero.
    Trim {
        input: OpInput,
        window: TimeWindow,
        /// Trim the audio track in step with the video instead of
        /// dropping it.
        with_audio: bool,
        output: String,
    },

    /// Resize to the target resolution.
    Scale {
        input: OpInput,
        target: Resolution,
        mode: ScaleMode,
        /// Carry the input's audio track through unchanged timing.
        with_audio: bool,
        output: String,
    },

    /// Scale every input to the target and join them in list order.
    Concat {
        inputs: Vec<OpInput>,
        target: Resolution,
        /// Carry each input's own audio track through the join.
        with_audio: bool,
        output: String,
    },

    /// Composite `overlay` onto `background` inside `window` on the
    /// background's timeline.
    Overlay {
        background: OpInput,
        overlay: OpInput,
        window: TimeWindow,
        target: Resolution,
        output: String,
    },

    /// Drop the audio track.
    StripAudio { input: OpInput, output: String },

    /// Copy the video stream and mux a re-encoded audio track; the longer
    /// stream is truncated.
    MuxAudio {
        video: OpInput,
        audio: OpInput,
        output: String,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Trim { .. } => OperationKind::Trim,
            Operation::Scale { .. } => OperationKind::Scale,
            Operation::Concat { .. } => OperationKind::Concat,
            Operation::Overlay { .. } => OperationKind::Overlay,
            Operation::StripAudio { .. } => OperationKind::StripAudio,
            Operation::MuxAudio { .. } => OperationKind::MuxAudio,
        }
    }

    /// Name of the single output artifact.
    pub fn output(&self) -> &str {
        match self {
            Operation::Trim { output, .. }
            | Operation::Scale { output, .. }
            | Operation::Concat { output, .. }
            | Operation::Overlay { output, .. }
            | Operation::StripAudio { output, .. }
            | Operation::MuxAudio { output, .. } => output,
        }
    }

    /// Declared inputs, in positional order.
    pub fn inputs(&self) -> Vec<&OpInput> {
        match self {
            Operation::Trim { input, .. }
            | Operation::Scale { input, .. }
            | Operation::StripAudio { input, .. } => vec![input],
            Operation::Concat { inputs, .. } => inputs.iter().collect(),
            Operation::Overlay {
                background, overlay, ..
            } => vec![background, overlay],
            Operation::MuxAudio { video, audio, .. } => vec![video, audio],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_reports_kind_output_and_inputs() {
        let op = Operation::Overlay {
            background: OpInput::clip("/media/bg.mp4"),
            overlay: OpInput::artifact("overlay-track"),
            window: TimeWindow::new(10.0, 20.0),
            target: Resolution::new(1080, 1920).unwrap(),
            output: "composited".to_string(),
        };

        assert_eq!(op.kind(), OperationKind::Overlay);
        assert_eq!(op.output(), "composited");
        assert_eq!(op.inputs().len(), 2);
        assert_eq!(op.kind().to_string(), "overlay");
    }

    #[test]
    fn concat_lists_all_inputs_in_order() {
        let op = Operation::Concat {
            inputs: vec![
                OpInput::artifact("lead-in"),
                OpInput::clip("/media/full.mp4"),
            ],
            target: Resolution::new(1080, 1920).unwrap(),
            with_audio: false,
            output: "overlay-track".to_string(),
        };

        let inputs = op.inputs();
        assert_eq!(inputs[0], &OpInput::artifact("lead-in"));
        assert_eq!(inputs[1], &OpInput::clip("/media/full.mp4"));
    }
}
