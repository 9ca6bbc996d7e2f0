// src/lib.rs
//! Tattie Dataset Engine
//!
//! A synthetic dataset generation engine: procedurally randomizes a 3D
//! scene, renders each variation, and exports the frames together with
//! structured ground-truth annotations (object poses, 2D bounding boxes,
//! visibility, camera parameters) as a JSON manifest.
//!
//! The loop is randomize -> render -> extract -> write, once per sample,
//! with per-sample fault isolation and a seeded RNG so any dataset can be
//! regenerated exactly. The renderer is pluggable: the built-in
//! [`FlatRenderer`](render::FlatRenderer) produces deterministic
//! flat-shaded frames, and adapters to a host render engine implement the
//! same [`Renderer`](render::Renderer) trait.

pub mod annotate;
pub mod camera;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod randomize;
pub mod render;
pub mod scene;

// Re-export main types for convenience
pub use pipeline::{CancelFlag, Pipeline, RunOptions, RunSummary};

use std::path::Path;

use error::PipelineError;
use randomize::RandomizationConfig;
use render::FlatRenderer;
use scene::Scene;

/// Creates a pipeline over the built-in flat renderer
pub fn default_pipeline(
    scene: Scene,
    config: RandomizationConfig,
    output_dir: impl AsRef<Path>,
    options: RunOptions,
) -> Result<Pipeline<FlatRenderer>, PipelineError> {
    Pipeline::new(scene, config, FlatRenderer::new(), output_dir, options)
}
