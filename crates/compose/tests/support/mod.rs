//! Fake media engine for pipeline tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reelforge_common::{ReelforgeError, ReelforgeResult};
use reelforge_engine::{MediaEngine, ProgressCallback, TranscodeJob};
use reelforge_media_model::{OperationKind, StreamMetadata};

pub fn meta(width: u32, height: u32, codec: &str, fps: &str, duration_secs: f64) -> StreamMetadata {
    StreamMetadata {
        width,
        height,
        codec: codec.to_string(),
        fps: fps.to_string(),
        duration_secs,
    }
}

/// Deterministic engine double: records every job, fabricates artifacts
/// on disk, and can be told to fail a specific operation kind.
pub struct FakeEngine {
    metas: HashMap<PathBuf, StreamMetadata>,
    probes: AtomicUsize,
    runs: Mutex<Vec<TranscodeJob>>,
    fail_on: Option<OperationKind>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            metas: HashMap::new(),
            probes: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
            fail_on: None,
        })
    }

    pub fn with_metas(entries: Vec<(PathBuf, StreamMetadata)>) -> Arc<Self> {
        Arc::new(Self {
            metas: entries.into_iter().collect(),
            probes: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
            fail_on: None,
        })
    }

    pub fn failing_on(kind: OperationKind) -> Arc<Self> {
        Arc::new(Self {
            metas: HashMap::new(),
            probes: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
            fail_on: Some(kind),
        })
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.runs.lock().unwrap().clone()
    }

    pub fn job_kinds(&self) -> Vec<OperationKind> {
        self.jobs().iter().map(|job| job.kind).collect()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl MediaEngine for FakeEngine {
    fn probe(&self, path: &Path) -> ReelforgeResult<StreamMetadata> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(meta) = self.metas.get(path) {
            return Ok(meta.clone());
        }
        // Unconfigured paths probe as a plain vertical clip.
        Ok(meta_default())
    }

    fn run(&self, job: &TranscodeJob, _progress: Option<&ProgressCallback>) -> ReelforgeResult<()> {
        if self.fail_on == Some(job.kind) {
            return Err(ReelforgeError::engine(job.kind.as_str(), "injected failure"));
        }

        for input in &job.inputs {
            if !input.path.exists() {
                return Err(ReelforgeError::engine(
                    job.kind.as_str(),
                    format!("missing input {}", input.path.display()),
                ));
            }
        }

        std::fs::write(&job.output, b"fake artifact").map_err(ReelforgeError::Filesystem)?;
        self.runs.lock().unwrap().push(job.clone());
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn meta_default() -> StreamMetadata {
    meta(1080, 1920, "h264", "30/1", 60.0)
}
