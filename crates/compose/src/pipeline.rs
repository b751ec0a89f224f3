//! Pipeline orchestration.
//!
//! One [`PipelineRequest`] is executed by an explicit forward-only state
//! machine. Each transition dispatches at most one engine invocation and
//! suspends until it completes; stages never overlap, and a failure at
//! any stage aborts the rest and surfaces the originating error wrapped
//! with its stage index. Intermediate artifacts are torn down when the
//! run ends, success or failure; the final output is never touched.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_engine::{MediaEngine, ProgressCallback};
use reelforge_media_model::{Clip, OpInput, Operation, Resolution, ScaleMode, Scene, TimeWindow};

use crate::artifacts::ArtifactStore;
use crate::filter;
use crate::scene::{compile_scenes, SceneCompileOptions, SCENES_OUTPUT};
use crate::verify::verify_concat_inputs;

/// Stage indices reported by `ReelforgeError::Pipeline`.
pub const STAGE_LEAD_IN: usize = 0;
pub const STAGE_OVERLAY: usize = 1;
pub const STAGE_STRIP: usize = 2;
pub const STAGE_MUX: usize = 3;

const LEAD_IN_TRIM: &str = "lead-in-trim";
const LEAD_IN: &str = "lead-in";
const OVERLAY_TRACK: &str = "overlay-track";
const COMPOSITED: &str = "composited";
const VIDEO_ONLY: &str = "video-only";

/// One composition request. Everything request-scoped lives here; there
/// are no process-wide path or duration constants.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Background clip the overlay is composited onto.
    pub background: PathBuf,

    /// Overlay clip.
    pub overlay: PathBuf,

    /// Replacement audio track.
    pub audio: PathBuf,

    /// Output resolution.
    pub target: Resolution,

    /// Interval on the background's timeline where the overlay is
    /// visible.
    pub window: TimeWindow,

    /// Prepend a short repetition of the overlay (a teaser) before its
    /// full-length appearance.
    pub include_lead_in: bool,

    /// Teaser duration in seconds. Default 10.0
    /// (`ComposeDefaults::lead_in_secs`).
    pub lead_in_secs: f64,

    /// Final output path, outside the managed working directory.
    pub output: PathBuf,
}

impl PipelineRequest {
    pub fn validate(&self) -> ReelforgeResult<()> {
        if !self.window.is_valid() {
            return Err(ReelforgeError::invalid_input(format!(
                "overlay window must have non-negative start and duration, got start={} duration={}",
                self.window.start_secs, self.window.duration_secs
            )));
        }
        if !(self.lead_in_secs >= 0.0 && self.lead_in_secs.is_finite()) {
            return Err(ReelforgeError::invalid_input(format!(
                "lead-in duration must be non-negative, got {}",
                self.lead_in_secs
            )));
        }
        for path in [&self.background, &self.overlay, &self.audio] {
            if !path.exists() {
                return Err(ReelforgeError::FileNotFound { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// States of a pipeline run. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    LeadIn,
    Overlaying,
    StrippingAudio,
    Muxing,
    Done,
    Failed,
}

impl PipelineState {
    /// Stage index for error reporting; `None` for non-stage states.
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            PipelineState::LeadIn => Some(STAGE_LEAD_IN),
            PipelineState::Overlaying => Some(STAGE_OVERLAY),
            PipelineState::StrippingAudio => Some(STAGE_STRIP),
            PipelineState::Muxing => Some(STAGE_MUX),
            PipelineState::Pending | PipelineState::Done | PipelineState::Failed => None,
        }
    }
}

/// Cooperative cancellation. In-flight engine invocations are never
/// killed; a cancelled run stops before its next stage.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Execution context of one run: the engine handle, the artifact store,
/// and an optional progress sink shared by every stage.
struct RunContext {
    engine: Arc<dyn MediaEngine>,
    artifacts: ArtifactStore,
    progress: Option<Arc<ProgressCallback>>,
}

impl RunContext {
    fn resolve_inputs(&self, op: &Operation) -> ReelforgeResult<Vec<PathBuf>> {
        let mut resolved = Vec::with_capacity(op.inputs().len());
        for input in op.inputs() {
            let path = match input {
                OpInput::Clip(path) => path.clone(),
                OpInput::Artifact(name) => self
                    .artifacts
                    .path_of(name)
                    .ok_or_else(|| {
                        ReelforgeError::invalid_input(format!("unknown artifact '{name}'"))
                    })?
                    .to_path_buf(),
            };
            // Invariant: every input exists before the operation runs.
            if !path.exists() {
                return Err(ReelforgeError::FileNotFound { path });
            }
            resolved.push(path);
        }
        Ok(resolved)
    }

    /// Execute one operation writing to an explicit output path.
    async fn execute_to(
        &mut self,
        op: &Operation,
        output: PathBuf,
        expected_duration_secs: Option<f64>,
    ) -> ReelforgeResult<PathBuf> {
        let inputs = self.resolve_inputs(op)?;
        let job = filter::build_job(op, &inputs, output.clone(), expected_duration_secs)?;

        tracing::info!(
            kind = %op.kind(),
            inputs = inputs.len(),
            output = %output.display(),
            "Dispatching engine invocation"
        );

        let engine = self.engine.clone();
        let progress = self.progress.clone();
        tokio::task::spawn_blocking(move || engine.run(&job, progress.as_deref()))
            .await
            .map_err(|e| ReelforgeError::Other(anyhow::anyhow!("engine task failed: {e}")))??;

        Ok(output)
    }

    /// Execute one operation into a managed temp artifact.
    async fn execute(
        &mut self,
        op: &Operation,
        expected_duration_secs: Option<f64>,
    ) -> ReelforgeResult<PathBuf> {
        let output = self.artifacts.allocate(op.output());
        self.execute_to(op, output, expected_duration_secs).await
    }
}

/// Probe a source clip once; the metadata stays cached on the clip for
/// the rest of the run.
async fn probe_clip(engine: &Arc<dyn MediaEngine>, path: &Path) -> Clip {
    let mut clip = Clip::new(path);
    let engine = engine.clone();
    let probe_path = clip.path.clone();
    let probed = tokio::task::spawn_blocking(move || engine.probe(&probe_path).ok())
        .await
        .ok()
        .flatten();
    if let Some(metadata) = probed {
        clip.resolve(metadata);
    }
    clip
}

/// Run one composition request end to end and return the final output
/// path.
pub async fn run_pipeline(
    engine: Arc<dyn MediaEngine>,
    request: PipelineRequest,
    work_base: &Path,
    progress: Option<ProgressCallback>,
    cancel: Option<CancelHandle>,
) -> ReelforgeResult<PathBuf> {
    request.validate()?;
    if let Some(parent) = request.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let artifacts = ArtifactStore::create(work_base)?;
    tracing::info!(
        workdir = %artifacts.workdir().display(),
        output = %request.output.display(),
        lead_in = request.include_lead_in,
        "Starting pipeline run"
    );

    let mut ctx = RunContext {
        engine: engine.clone(),
        artifacts,
        progress: progress.map(Arc::new),
    };

    // Durations scale progress reports only; failures here never fail
    // the run.
    let background = probe_clip(&engine, &request.background).await;
    let overlay = probe_clip(&engine, &request.overlay).await;
    let background_duration = background.metadata.as_ref().map(|m| m.duration_secs);
    let overlay_duration = overlay.metadata.as_ref().map(|m| m.duration_secs);

    let mut state = PipelineState::Pending;
    let outcome = loop {
        if let Some(handle) = &cancel {
            // Done is not a stage; a run that already produced its output
            // reports success even if cancellation raced the last mux.
            if handle.is_cancelled() && state != PipelineState::Done {
                break Err(ReelforgeError::Cancelled {
                    stage: state.stage_index().unwrap_or(STAGE_LEAD_IN),
                });
            }
        }

        tracing::debug!(?state, "Pipeline state");
        state = match state {
            PipelineState::Pending => {
                if request.include_lead_in {
                    PipelineState::LeadIn
                } else {
                    PipelineState::Overlaying
                }
            }

            PipelineState::LeadIn => {
                match run_lead_in(&mut ctx, &request, overlay_duration).await {
                    Ok(()) => PipelineState::Overlaying,
                    Err(e) => break Err(ReelforgeError::pipeline(STAGE_LEAD_IN, "lead-in", e)),
                }
            }

            PipelineState::Overlaying => {
                let overlay_input = if request.include_lead_in {
                    OpInput::artifact(OVERLAY_TRACK)
                } else {
                    OpInput::clip(&request.overlay)
                };
                let op = Operation::Overlay {
                    background: OpInput::clip(&request.background),
                    overlay: overlay_input,
                    window: request.window,
                    target: request.target,
                    output: COMPOSITED.to_string(),
                };
                match ctx.execute(&op, background_duration).await {
                    Ok(_) => PipelineState::StrippingAudio,
                    Err(e) => break Err(ReelforgeError::pipeline(STAGE_OVERLAY, "overlay", e)),
                }
            }

            PipelineState::StrippingAudio => {
                let op = Operation::StripAudio {
                    input: OpInput::artifact(COMPOSITED),
                    output: VIDEO_ONLY.to_string(),
                };
                match ctx.execute(&op, background_duration).await {
                    Ok(_) => PipelineState::Muxing,
                    Err(e) => break Err(ReelforgeError::pipeline(STAGE_STRIP, "strip-audio", e)),
                }
            }

            PipelineState::Muxing => {
                let op = Operation::MuxAudio {
                    video: OpInput::artifact(VIDEO_ONLY),
                    audio: OpInput::clip(&request.audio),
                    output: "final".to_string(),
                };
                match ctx
                    .execute_to(&op, request.output.clone(), background_duration)
                    .await
                {
                    Ok(path) => {
                        ctx.artifacts.set_final(path);
                        PipelineState::Done
                    }
                    Err(e) => break Err(ReelforgeError::pipeline(STAGE_MUX, "mux-audio", e)),
                }
            }

            PipelineState::Done => break Ok(request.output.clone()),

            // Failed is terminal; the loop never re-enters it.
            PipelineState::Failed => unreachable!("failed state is only reported, never run"),
        };
    };

    let final_state = if outcome.is_ok() {
        PipelineState::Done
    } else {
        PipelineState::Failed
    };
    match &outcome {
        Ok(path) => tracing::info!(?final_state, output = %path.display(), "Pipeline run complete"),
        Err(e) => tracing::warn!(?final_state, error = %e, "Pipeline run aborted"),
    }

    // ctx drops here; the artifact store removes every non-final artifact.
    outcome
}

/// LeadIn stage: trim a teaser off the overlay, normalize it, and splice
/// it in front of the full overlay clip.
async fn run_lead_in(
    ctx: &mut RunContext,
    request: &PipelineRequest,
    overlay_duration: Option<f64>,
) -> ReelforgeResult<()> {
    let trim = Operation::Trim {
        input: OpInput::clip(&request.overlay),
        window: TimeWindow::from_zero(request.lead_in_secs),
        with_audio: false,
        output: LEAD_IN_TRIM.to_string(),
    };
    ctx.execute(&trim, Some(request.lead_in_secs)).await?;

    let scale = Operation::Scale {
        input: OpInput::artifact(LEAD_IN_TRIM),
        target: request.target,
        mode: ScaleMode::Stretch,
        with_audio: false,
        output: LEAD_IN.to_string(),
    };
    ctx.execute(&scale, Some(request.lead_in_secs)).await?;

    let concat = Operation::Concat {
        inputs: vec![OpInput::artifact(LEAD_IN), OpInput::clip(&request.overlay)],
        target: request.target,
        with_audio: false,
        output: OVERLAY_TRACK.to_string(),
    };
    let expected = overlay_duration.map(|d| d + request.lead_in_secs.min(d));
    ctx.execute(&concat, expected).await?;

    Ok(())
}

/// Render a declarative scene list to `output`.
///
/// Unless the options preserve original audio, the optional replacement
/// `audio` track is muxed onto the concatenated scenes.
pub async fn render_scenes(
    engine: Arc<dyn MediaEngine>,
    scenes: &[Scene],
    target: Resolution,
    options: &SceneCompileOptions,
    audio: Option<PathBuf>,
    output: PathBuf,
    work_base: &Path,
) -> ReelforgeResult<PathBuf> {
    let ops = compile_scenes(scenes, target, options)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let artifacts = ArtifactStore::create(work_base)?;
    tracing::info!(
        workdir = %artifacts.workdir().display(),
        scenes = scenes.len(),
        preserve_audio = options.preserve_audio,
        "Rendering scenes"
    );

    let mut ctx = RunContext {
        engine,
        artifacts,
        progress: None,
    };

    let mux_audio = if options.preserve_audio { None } else { audio };

    let last = ops.len() - 1;
    for (index, op) in ops.iter().enumerate() {
        let writes_final = index == last && mux_audio.is_none();
        let result = if writes_final {
            ctx.execute_to(op, output.clone(), None).await
        } else {
            ctx.execute(op, None).await
        };
        let path = result.map_err(|e| ReelforgeError::pipeline(index, op.kind().as_str(), e))?;
        if writes_final {
            ctx.artifacts.set_final(path);
        }
    }

    if let Some(audio) = mux_audio {
        let op = Operation::MuxAudio {
            video: OpInput::artifact(SCENES_OUTPUT),
            audio: OpInput::clip(audio),
            output: "final".to_string(),
        };
        let path = ctx
            .execute_to(&op, output.clone(), None)
            .await
            .map_err(|e| ReelforgeError::pipeline(ops.len(), "mux-audio", e))?;
        ctx.artifacts.set_final(path);
    }

    Ok(output)
}

/// Byte-preserving concatenation of compatible clips.
///
/// The compatibility verifier gates the engine dispatch: incompatible
/// inputs fail here without wasting an invocation on a doomed concat.
pub async fn concat_compatible(
    engine: Arc<dyn MediaEngine>,
    paths: Vec<PathBuf>,
    output: PathBuf,
    work_base: &Path,
) -> ReelforgeResult<PathBuf> {
    let metas = verify_concat_inputs(engine.clone(), paths.clone()).await?;
    let expected: f64 = metas.iter().map(|m| m.duration_secs).sum();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut artifacts = ArtifactStore::create(work_base)?;
    let list_path = artifacts.allocate_with_ext("concat-list", "txt");
    std::fs::write(&list_path, filter::concat_list_content(&paths))?;

    let job = filter::concat_copy_job(&list_path, output.clone(), Some(expected));
    tracing::info!(
        clips = paths.len(),
        output = %output.display(),
        "Dispatching stream-copy concat"
    );

    let run_engine = engine.clone();
    tokio::task::spawn_blocking(move || run_engine.run(&job, None))
        .await
        .map_err(|e| ReelforgeError::Other(anyhow::anyhow!("engine task failed: {e}")))??;

    artifacts.set_final(&output);
    Ok(output)
}
