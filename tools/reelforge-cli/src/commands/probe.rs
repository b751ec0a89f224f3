//! Show stream metadata for a media file.

use std::path::PathBuf;

use reelforge_engine::{FfmpegEngine, MediaEngine};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let engine = FfmpegEngine::new();
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "No media engine found (expected ffmpeg and ffprobe in PATH)"
        ));
    }

    let meta = engine
        .probe(&path)
        .map_err(|e| anyhow::anyhow!("Probe failed: {e}"))?;

    println!("Metadata for {}:", path.display());
    println!("  Resolution: {}x{}", meta.width, meta.height);
    println!("  Codec:      {}", meta.codec);
    match meta.fps_f64() {
        Some(fps) => println!("  Frame rate: {} ({:.3} fps)", meta.fps, fps),
        None => println!("  Frame rate: {}", meta.fps),
    }
    println!("  Duration:   {:.3}s", meta.duration_secs);

    Ok(())
}
