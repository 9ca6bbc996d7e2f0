//! # Tattie Prelude
//!
//! This module provides a convenient way to import commonly used types
//! from the engine. It's designed to reduce boilerplate imports in typical
//! generation scripts.
//!
//! ## Usage
//!
//! ```rust
//! use tattie::prelude::*;
//! ```
//!
//! This brings all essential types into scope, allowing you to write:
//!
//! ```no_run
//! use tattie::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let camera = RenderCamera::new(5.0, 0.4, 0.2, Vector3::zero(), (640, 480));
//!     let mut scene = Scene::new(camera);
//!     scene.add_material_rgb("red", 0.9, 0.1, 0.1);
//!     scene.add_object(Object::cube("cube").with_material("red"));
//!     scene.add_light(Light::new("lamp", 10.0));
//!
//!     let config = RandomizationConfig::new()
//!         .with_seed(42)
//!         .with_object(ObjectRule::new("cube").with_location([-1.0; 3], [1.0; 3]));
//!
//!     let pipeline = tattie::default_pipeline(scene, config, "output", RunOptions::new(20))?;
//!     let summary = pipeline.run()?;
//!     println!("wrote {} samples", summary.written.len());
//!     Ok(())
//! }
//! ```

// Re-export core pipeline types
pub use crate::default_pipeline;
pub use crate::pipeline::{CancelFlag, Pipeline, PipelineState, RunOptions, RunSummary};

// Re-export scene types
pub use crate::camera::{Intrinsics, RenderCamera};
pub use crate::scene::{Aabb, Light, Material, MaterialManager, Object, Scene, SceneSnapshot};

// Re-export randomization types
pub use crate::randomize::{
    CameraRule, LightRule, ObjectRule, PlacementRule, RandomizationConfig, Range, Range3,
    SceneDelta,
};

// Re-export rendering and annotation types
pub use crate::annotate::{FrameAnnotations, ObjectAnnotation};
pub use crate::render::{FlatRenderer, RenderedFrame, Renderer};

// Re-export error types
pub use crate::error::{ConfigError, PipelineError, RenderError, SceneAccessError};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
