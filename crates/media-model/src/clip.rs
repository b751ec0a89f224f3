//! Source clips and probed stream metadata.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Metadata for the first video stream of a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Codec identifier (e.g., "h264").
    pub codec: String,

    /// Frame rate as the prober's rational string (e.g., "30000/1001").
    /// Kept verbatim so compatibility checks compare exactly.
    pub fps: String,

    /// Stream duration in seconds.
    pub duration_secs: f64,
}

impl StreamMetadata {
    /// Frame rate as a float, when the rational string parses.
    pub fn fps_f64(&self) -> Option<f64> {
        match self.fps.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.trim().parse().ok()?;
                let den: f64 = den.trim().parse().ok()?;
                if den == 0.0 {
                    return None;
                }
                Some(num / den)
            }
            None => self.fps.trim().parse().ok(),
        }
    }
}

/// A source video file reference plus optional probed metadata.
///
/// Identity is the path. Metadata is resolved at most once per run and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Path to the source file.
    pub path: PathBuf,

    /// Probed metadata, if resolved.
    pub metadata: Option<StreamMetadata>,
}

impl Clip {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metadata: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attach probed metadata. The first resolution wins; later calls
    /// return the cached value unchanged.
    pub fn resolve(&mut self, metadata: StreamMetadata) -> &StreamMetadata {
        self.metadata.get_or_insert(metadata)
    }

    pub fn is_resolved(&self) -> bool {
        self.metadata.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(fps: &str) -> StreamMetadata {
        StreamMetadata {
            width: 1080,
            height: 1920,
            codec: "h264".to_string(),
            fps: fps.to_string(),
            duration_secs: 12.0,
        }
    }

    #[test]
    fn fps_parses_rational_strings() {
        assert_eq!(meta("30/1").fps_f64(), Some(30.0));
        let ntsc = meta("30000/1001").fps_f64().unwrap();
        assert!((ntsc - 29.97).abs() < 0.001);
    }

    #[test]
    fn fps_parses_plain_numbers_and_rejects_zero_denominator() {
        assert_eq!(meta("25").fps_f64(), Some(25.0));
        assert_eq!(meta("30/0").fps_f64(), None);
        assert_eq!(meta("junk").fps_f64(), None);
    }

    #[test]
    fn clip_metadata_resolves_once() {
        let mut clip = Clip::new("/media/bg.mp4");
        assert!(!clip.is_resolved());

        clip.resolve(meta("30/1"));
        let cached = clip.resolve(meta("60/1"));
        assert_eq!(cached.fps, "30/1");
    }
}
