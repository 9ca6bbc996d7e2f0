//! Error types for the dataset generation pipeline
//!
//! Errors are split by where they can occur and how the pipeline reacts:
//!
//! - [`ConfigError`] - invalid randomization config, raised at load time
//!   before any rendering or file output
//! - [`SceneAccessError`] - a referenced identifier is missing from the
//!   scene graph, skips the current sample
//! - [`RenderError`] - the renderer failed, skips the current sample and
//!   counts toward the abort threshold
//! - [`DatasetError`] - disk or encoding failure while writing output,
//!   fatal for the run
//! - [`PipelineError`] - top-level run outcome, including abort after too
//!   many consecutive per-sample failures

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::RunSummary;

/// Invalid randomization configuration.
///
/// Raised once when the config is validated, never per sample.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid range for {field}: min {min} is greater than max {max}")]
    InvalidRange { field: String, min: f32, max: f32 },

    #[error("placement attempt budget must be at least 1")]
    ZeroAttempts,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A referenced identifier does not exist in the current scene graph.
///
/// Fatal for the sample that referenced it, not for the run.
#[derive(Debug, Error)]
pub enum SceneAccessError {
    #[error("object '{0}' does not exist in the scene")]
    ObjectNotFound(String),

    #[error("light '{0}' does not exist in the scene")]
    LightNotFound(String),

    #[error("material '{0}' is not registered in the material library")]
    MaterialNotFound(String),
}

/// Failure to load scene geometry from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load OBJ file '{path}': {source}")]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file '{0}' contains no vertices")]
    EmptyMesh(PathBuf),
}

/// The renderer failed to produce a frame.
///
/// The pipeline driver decides whether to retry or skip the sample.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer failed: {0}")]
    Failed(String),

    #[error("render timed out after {0:?}")]
    Timeout(Duration),
}

/// Disk or encoding failure while writing dataset output.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level pipeline failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Too many consecutive samples failed. The manifest has already been
    /// finalized with the records written so far.
    #[error("aborted after {consecutive} consecutive failed samples (last index {last_index})")]
    Aborted {
        consecutive: u32,
        last_index: usize,
        summary: RunSummary,
    },
}
