//! Stream-copy concatenation of compatible clips.

use std::path::PathBuf;
use std::sync::Arc;

use reelforge_common::AppConfig;
use reelforge_compose::concat_compatible;
use reelforge_engine::{FfmpegEngine, MediaEngine};

pub async fn run(paths: Vec<PathBuf>, output: PathBuf) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let engine: Arc<dyn MediaEngine> = Arc::new(FfmpegEngine::new());
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "No media engine found (expected ffmpeg and ffprobe in PATH)"
        ));
    }

    println!("Concatenating {} clip(s)", paths.len());

    match concat_compatible(engine, paths, output, &config.work_dir).await {
        Ok(path) => println!("Concat complete: {}", path.display()),
        Err(e) => println!("Concat failed: {e}"),
    }

    Ok(())
}
