//! Concat compatibility check.

use std::path::PathBuf;
use std::sync::Arc;

use reelforge_compose::verify_concat_inputs;
use reelforge_engine::{FfmpegEngine, MediaEngine};

pub async fn run(paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let engine: Arc<dyn MediaEngine> = Arc::new(FfmpegEngine::new());
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "No media engine found (expected ffmpeg and ffprobe in PATH)"
        ));
    }

    match verify_concat_inputs(engine, paths.clone()).await {
        Ok(metas) => {
            println!("Compatible: {} clip(s) can be stream-copy concatenated", metas.len());
            for (path, meta) in paths.iter().zip(metas.iter()) {
                println!(
                    "  {}: {}x{} {} {} ({:.3}s)",
                    path.display(),
                    meta.width,
                    meta.height,
                    meta.codec,
                    meta.fps,
                    meta.duration_secs
                );
            }
        }
        Err(e) => {
            println!("Incompatible: {e}");
        }
    }

    Ok(())
}
