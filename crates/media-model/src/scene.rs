//! Declarative scenes and layers.
//!
//! A scene is an ordered stack of layers that compiles to one normalized
//! video stream. The compiler currently supports exactly one video layer
//! per scene; richer in-scene compositing is reported as unsupported
//! rather than silently approximated.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Layer content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Video,
    Audio,
}

/// One layer of a scene: a kind plus the clip it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Layer content type.
    pub kind: LayerKind,

    /// Path to the referenced clip.
    pub clip: PathBuf,
}

impl Layer {
    pub fn video(clip: impl Into<PathBuf>) -> Self {
        Self {
            kind: LayerKind::Video,
            clip: clip.into(),
        }
    }

    pub fn audio(clip: impl Into<PathBuf>) -> Self {
        Self {
            kind: LayerKind::Audio,
            clip: clip.into(),
        }
    }
}

/// An ordered sequence of layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Convenience constructor for the common single-clip scene.
    pub fn from_clip(clip: impl Into<PathBuf>) -> Self {
        Self {
            layers: vec![Layer::video(clip)],
        }
    }

    pub fn video_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(|layer| layer.kind == LayerKind::Video)
    }

    pub fn video_layer_count(&self) -> usize {
        self.video_layers().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_counts_only_video_layers() {
        let scene = Scene::new(vec![
            Layer::video("/media/a.mp4"),
            Layer::audio("/media/a.mp3"),
        ]);
        assert_eq!(scene.video_layer_count(), 1);
        assert_eq!(scene.layers.len(), 2);
    }

    #[test]
    fn scene_descriptors_deserialize_from_json() {
        let json = r#"[
            {"layers": [{"kind": "video", "clip": "/media/one.mp4"}]},
            {"layers": [{"kind": "video", "clip": "/media/two.mp4"},
                        {"kind": "audio", "clip": "/media/two.wav"}]}
        ]"#;
        let scenes: Vec<Scene> = serde_json::from_str(json).unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].video_layer_count(), 1);
        assert_eq!(scenes[1].layers[1].kind, LayerKind::Audio);
    }
}
