//! # Randomization Module
//!
//! Samples scene perturbations from configured distributions, one
//! [`SceneDelta`] per dataset sample.
//!
//! ## Key Components
//!
//! - [`RandomizationConfig`] - declarative, serde-backed description of
//!   what varies and over which ranges; validated once at load time
//! - [`RandomizationPolicy`] - draws deltas from the config with a seeded
//!   RNG; deterministic for a given seed and config
//! - [`SceneDelta`] - the per-sample change set applied atomically to the
//!   scene
//!
//! ## Reproducibility
//!
//! All randomness flows through one explicit `StdRng` seeded from the
//! config. There is no ambient RNG anywhere in the pipeline, so a dataset
//! can be regenerated exactly from the `config.json` stored next to its
//! manifest.

pub mod config;
pub mod delta;
pub mod placement;
pub mod policy;

// Re-export main types
pub use config::{
    CameraRule, LightRule, ObjectRule, PlacementRule, RandomizationConfig, Range, Range3,
};
pub use delta::{CameraDelta, LightDelta, ObjectDelta, SceneDelta};
pub use policy::RandomizationPolicy;
