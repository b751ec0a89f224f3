//! Scene compilation.
//!
//! Turns declarative scene descriptors into the canonical operation
//! sequence: per-scene trim and scale, then one concat in input order.
//! The model is deliberately narrow: one video layer per scene; anything
//! else is reported, never approximated.

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_media_model::{OpInput, Operation, Resolution, ScaleMode, Scene, TimeWindow};

/// Output artifact name of the final scene concat.
pub const SCENES_OUTPUT: &str = "scenes";

/// Options controlling scene compilation.
#[derive(Debug, Clone)]
pub struct SceneCompileOptions {
    /// Duration each scene's video layer is trimmed to, from its own
    /// time zero.
    pub scene_duration_secs: f64,

    /// How scene content is fitted to the target resolution.
    pub scale_mode: ScaleMode,

    /// Carry each scene's own audio track through the concat instead of
    /// replacing audio later. When set, callers skip the mux stage.
    pub preserve_audio: bool,
}

impl Default for SceneCompileOptions {
    fn default() -> Self {
        Self {
            scene_duration_secs: 20.0,
            scale_mode: ScaleMode::Stretch,
            preserve_audio: false,
        }
    }
}

/// Compile scenes into an ordered operation sequence.
///
/// Artifact names: `scene-{i}-trim` and `scene-{i}` per scene, then
/// [`SCENES_OUTPUT`] for the concat joining them in input order.
pub fn compile_scenes(
    scenes: &[Scene],
    target: Resolution,
    options: &SceneCompileOptions,
) -> ReelforgeResult<Vec<Operation>> {
    if scenes.is_empty() {
        return Err(ReelforgeError::invalid_input("no scenes to compile"));
    }
    if !(options.scene_duration_secs > 0.0 && options.scene_duration_secs.is_finite()) {
        return Err(ReelforgeError::invalid_input(format!(
            "scene duration must be positive, got {}",
            options.scene_duration_secs
        )));
    }

    let mut ops = Vec::with_capacity(scenes.len() * 2 + 1);
    let mut scene_outputs = Vec::with_capacity(scenes.len());

    for (index, scene) in scenes.iter().enumerate() {
        let video_layers = scene.video_layer_count();
        if video_layers != 1 {
            return Err(ReelforgeError::UnsupportedScene {
                index,
                video_layers,
            });
        }

        let layer = scene
            .video_layers()
            .next()
            .expect("exactly one video layer");

        let trim_name = format!("scene-{index}-trim");
        let scene_name = format!("scene-{index}");

        ops.push(Operation::Trim {
            input: OpInput::clip(&layer.clip),
            window: TimeWindow::from_zero(options.scene_duration_secs),
            with_audio: options.preserve_audio,
            output: trim_name.clone(),
        });
        ops.push(Operation::Scale {
            input: OpInput::artifact(trim_name),
            target,
            mode: options.scale_mode,
            with_audio: options.preserve_audio,
            output: scene_name.clone(),
        });
        scene_outputs.push(OpInput::artifact(scene_name));
    }

    ops.push(Operation::Concat {
        inputs: scene_outputs,
        target,
        with_audio: options.preserve_audio,
        output: SCENES_OUTPUT.to_string(),
    });

    Ok(ops)
}
