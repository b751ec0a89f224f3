//! Check system capabilities.

use reelforge_engine::{FfmpegEngine, MediaEngine};

pub fn run() -> anyhow::Result<()> {
    let engine = FfmpegEngine::new();

    println!("System check:");
    if engine.is_available() {
        println!("  Engine '{}': available", engine.name());
    } else {
        println!("  Engine '{}': NOT FOUND (install ffmpeg and ffprobe)", engine.name());
    }

    Ok(())
}
