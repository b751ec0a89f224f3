//! Temp artifact bookkeeping.
//!
//! Every pipeline run gets its own working directory so concurrent runs
//! can never clobber each other's intermediates. The store records the
//! stage-name to path mapping, and tears everything down when the run
//! ends (success or failure), except the final output, which lives
//! outside the working directory and is never deleted automatically.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use reelforge_common::{ReelforgeError, ReelforgeResult};

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Owns the intermediate artifacts of one pipeline run.
#[derive(Debug)]
pub struct ArtifactStore {
    workdir: PathBuf,
    artifacts: Vec<(String, PathBuf)>,
    final_output: Option<PathBuf>,
    cleaned: bool,
}

impl ArtifactStore {
    /// Create a unique per-run working directory under `base`, creating
    /// `base` itself first if absent.
    pub fn create(base: &Path) -> ReelforgeResult<Self> {
        std::fs::create_dir_all(base)?;

        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        let pid = std::process::id();
        loop {
            let seq = RUN_SEQ.fetch_add(1, Ordering::SeqCst);
            let workdir = base.join(format!("run-{stamp}-{pid}-{seq}"));
            // create_dir (not _all) so an existing directory from another
            // run is detected and skipped instead of shared.
            match std::fs::create_dir(&workdir) {
                Ok(()) => {
                    tracing::debug!(workdir = %workdir.display(), "Created working directory");
                    return Ok(Self {
                        workdir,
                        artifacts: Vec::new(),
                        final_output: None,
                        cleaned: false,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ReelforgeError::Filesystem(e)),
            }
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Allocate the path for a named artifact and record the mapping.
    pub fn allocate(&mut self, name: &str) -> PathBuf {
        self.allocate_with_ext(name, "mp4")
    }

    /// Allocate an auxiliary artifact with a custom extension (e.g. a
    /// concat list file).
    pub fn allocate_with_ext(&mut self, name: &str, ext: &str) -> PathBuf {
        let path = self.workdir.join(format!("{name}.{ext}"));
        self.artifacts.push((name.to_string(), path.clone()));
        path
    }

    /// Resolve a previously allocated artifact by name.
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.artifacts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_path())
    }

    /// Stage-name to path mapping, in allocation order.
    pub fn entries(&self) -> &[(String, PathBuf)] {
        &self.artifacts
    }

    /// Mark the run's final output. It is exempt from cleanup even if a
    /// caller pointed it inside the working directory.
    pub fn set_final(&mut self, path: impl Into<PathBuf>) {
        self.final_output = Some(path.into());
    }

    pub fn final_output(&self) -> Option<&Path> {
        self.final_output.as_deref()
    }

    /// Delete every non-final artifact and the working directory.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        for (name, path) in &self.artifacts {
            if Some(path.as_path()) == self.final_output.as_deref() {
                continue;
            }
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(
                        artifact = %name,
                        path = %path.display(),
                        error = %e,
                        "Failed to remove temp artifact"
                    );
                }
            }
        }

        if let Err(e) = std::fs::remove_dir(&self.workdir) {
            tracing::warn!(
                workdir = %self.workdir.display(),
                error = %e,
                "Failed to remove working directory"
            );
        }
    }
}

impl Drop for ArtifactStore {
    fn drop(&mut self) {
        self.cleanup();
    }
}
