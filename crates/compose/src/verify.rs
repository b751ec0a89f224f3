//! Concat compatibility verification.
//!
//! Stream-copy concatenation cannot fix up mismatched streams, so every
//! input must agree with the first on width, height, codec, and frame
//! rate before the engine is ever dispatched. Re-encoded concatenation
//! normalizes resolution itself and bypasses this check.

use std::path::PathBuf;
use std::sync::Arc;

use reelforge_common::{MetadataField, ReelforgeError, ReelforgeResult};
use reelforge_engine::MediaEngine;
use reelforge_media_model::StreamMetadata;

/// Verify that `paths` can be stream-copy concatenated.
///
/// Probes run concurrently; results stay in input order. Returns the
/// probed metadata on success so callers can reuse it without probing
/// again. A single clip is trivially compatible.
pub async fn verify_concat_inputs(
    engine: Arc<dyn MediaEngine>,
    paths: Vec<PathBuf>,
) -> ReelforgeResult<Vec<StreamMetadata>> {
    if paths.is_empty() {
        return Err(ReelforgeError::invalid_input("no clips to verify"));
    }

    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let engine = engine.clone();
        handles.push(tokio::task::spawn_blocking(move || engine.probe(&path)));
    }

    let mut metas = Vec::with_capacity(handles.len());
    for handle in handles {
        let meta = handle
            .await
            .map_err(|e| ReelforgeError::Other(anyhow::anyhow!("probe task failed: {e}")))??;
        metas.push(meta);
    }

    let first = &metas[0];
    for (index, meta) in metas.iter().enumerate().skip(1) {
        let mismatch = if meta.width != first.width {
            Some(MetadataField::Width)
        } else if meta.height != first.height {
            Some(MetadataField::Height)
        } else if meta.codec != first.codec {
            Some(MetadataField::Codec)
        } else if meta.fps != first.fps {
            Some(MetadataField::Fps)
        } else {
            None
        };

        if let Some(field) = mismatch {
            return Err(ReelforgeError::Incompatible {
                field,
                first: 0,
                second: index,
            });
        }
    }

    Ok(metas)
}
