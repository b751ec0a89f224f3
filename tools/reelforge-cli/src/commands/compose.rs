//! Compose a vertical ad from a background, an overlay, and audio.

use std::path::PathBuf;
use std::sync::Arc;

use reelforge_common::AppConfig;
use reelforge_compose::{run_pipeline, PipelineRequest};
use reelforge_engine::{FfmpegEngine, MediaEngine, ProgressCallback};
use reelforge_media_model::{Resolution, TimeWindow};

pub async fn run(
    background: PathBuf,
    overlay: PathBuf,
    audio: PathBuf,
    resolution: String,
    window_start: f64,
    window_duration: f64,
    include_lead_in: bool,
    lead_in_secs: Option<f64>,
    output: PathBuf,
) -> anyhow::Result<()> {
    let config = AppConfig::load();
    let target: Resolution = resolution
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let request = PipelineRequest {
        background,
        overlay,
        audio,
        target,
        window: TimeWindow::new(window_start, window_duration),
        include_lead_in,
        lead_in_secs: lead_in_secs.unwrap_or(config.compose.lead_in_secs),
        output: output.clone(),
    };

    println!("Composing ad:");
    println!("  Background: {}", request.background.display());
    println!("  Overlay:    {}", request.overlay.display());
    println!("  Audio:      {}", request.audio.display());
    println!("  Resolution: {target}");
    println!(
        "  Window:     {}s..{}s",
        request.window.start_secs,
        request.window.end_secs()
    );
    println!("  Output:     {}", output.display());

    let engine: Arc<dyn MediaEngine> = Arc::new(FfmpegEngine::new());
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "No media engine found (expected ffmpeg and ffprobe in PATH)"
        ));
    }

    let progress: ProgressCallback = Box::new(|p| {
        print!("\r  Progress: {:.1}%  ", p.percent * 100.0);
    });

    match run_pipeline(engine, request, &config.work_dir, Some(progress), None).await {
        Ok(path) => {
            println!("\nCompose complete: {}", path.display());
        }
        Err(e) => {
            println!("\nCompose failed: {e}");
        }
    }

    Ok(())
}
