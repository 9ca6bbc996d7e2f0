//! # Scene Management Module
//!
//! This module provides the scene graph the pipeline randomizes and renders:
//! object hierarchies with TRS poses and bounding boxes, point lights, a
//! material library, and the camera.
//!
//! ## Key Components
//!
//! - [`Scene`] - The main scene container that manages objects, lights,
//!   materials, and the camera
//! - [`Object`] - Individual objects with pose, bounding box, and material
//!   assignment
//! - [`SceneSnapshot`] - Immutable per-sample capture consumed by both the
//!   renderer and the annotation extractor
//! - [`Material`] / [`MaterialManager`] - Centralized material storage
//!
//! ## State Ownership
//!
//! The scene is host-owned global state in the original system; here it is
//! wrapped behind an accessor interface so the rest of the pipeline depends
//! only on snapshot/restore and atomic delta application. Randomized values
//! never leak between samples: the driver restores the pre-sample snapshot
//! after every iteration.

pub mod light;
pub mod material;
pub mod object;
pub mod scene;

// Re-export main types
pub use light::Light;
pub use material::{Material, MaterialId, MaterialManager};
pub use object::{Aabb, Object};
pub use scene::{Scene, SceneSnapshot, SceneStatistics};
