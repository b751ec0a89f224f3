//! Render a declarative scene list.

use std::path::PathBuf;
use std::sync::Arc;

use reelforge_common::AppConfig;
use reelforge_compose::{render_scenes, SceneCompileOptions};
use reelforge_engine::{FfmpegEngine, MediaEngine};
use reelforge_media_model::{Resolution, ScaleMode, Scene};

pub async fn run(
    manifest: PathBuf,
    output: PathBuf,
    resolution: String,
    scene_duration: Option<f64>,
    scale_mode: String,
    preserve_audio: bool,
    audio: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = AppConfig::load();
    let target: Resolution = resolution
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let scale_mode: ScaleMode = scale_mode
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let content = std::fs::read_to_string(&manifest)
        .map_err(|e| anyhow::anyhow!("Failed to read manifest {}: {e}", manifest.display()))?;
    let scenes: Vec<Scene> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse manifest: {e}"))?;

    let options = SceneCompileOptions {
        scene_duration_secs: scene_duration.unwrap_or(config.compose.scene_duration_secs),
        scale_mode,
        preserve_audio,
    };

    println!("Rendering {} scene(s) at {target}", scenes.len());

    let engine: Arc<dyn MediaEngine> = Arc::new(FfmpegEngine::new());
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "No media engine found (expected ffmpeg and ffprobe in PATH)"
        ));
    }

    match render_scenes(
        engine,
        &scenes,
        target,
        &options,
        audio,
        output.clone(),
        &config.work_dir,
    )
    .await
    {
        Ok(path) => println!("Scene reel complete: {}", path.display()),
        Err(e) => println!("Scene render failed: {e}"),
    }

    Ok(())
}
