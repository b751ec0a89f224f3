//! ReelForge Compose
//!
//! The composition pipeline: turns a declarative request (background clip,
//! overlay clip, replacement audio, target resolution, overlay window)
//! into one rendered vertical ad by sequencing engine invocations.
//!
//! # Pipeline Architecture
//!
//! ```text
//! overlay.mp4 ──┬── Trim (lead-in) ── Scale ──┐
//!               │                             ├── Concat ──┐
//!               └─────────────────────────────┘            │
//! background.mp4 ─────────────── Overlay (time window) ────┤
//!                                                          ▼
//!                                                     StripAudio
//!                                                          │
//! audio.mp3 ──────────────────────────────── MuxAudio ◄────┘
//!                                                │
//!                                                ▼
//!                                            output.mp4
//! ```
//!
//! Each stage consumes the previous stage's artifact; artifacts live in a
//! per-run working directory and are deleted at teardown, success or not.
//! The final output is written outside the working directory and is never
//! deleted automatically.

pub mod artifacts;
pub mod filter;
pub mod pipeline;
pub mod scene;
pub mod verify;

pub use pipeline::*;
pub use scene::{compile_scenes, SceneCompileOptions};
pub use verify::verify_concat_inputs;
