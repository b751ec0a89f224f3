//! ReelForge Media Model
//!
//! Declarative data model shared by the composition pipeline:
//! - Source clips and their probed stream metadata
//! - Resolutions, time windows, and scaling modes
//! - Declarative scenes and layers
//! - The canonical transcoding operations

pub mod clip;
pub mod geometry;
pub mod ops;
pub mod scene;

pub use clip::*;
pub use geometry::*;
pub use ops::*;
pub use scene::*;
