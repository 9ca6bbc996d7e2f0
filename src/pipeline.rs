//! # Pipeline Driver
//!
//! Orchestrates the generation loop: randomize, render, extract, write,
//! once per sample, strictly sequentially. The host renderer is not safe
//! for concurrent invocation against one scene, so there is no parallelism
//! here; rendering is the blocking operation and the driver owns the scene
//! exclusively for the whole run.
//!
//! ## Fault isolation
//!
//! Per-sample errors (a missing object, a failed render) skip the sample
//! and never propagate past the driver. Consecutive failures above a
//! configurable threshold abort the run; the manifest is still finalized
//! with everything written so far. Config errors abort before any side
//! effect.
//!
//! ## Cancellation
//!
//! A cooperative [`CancelFlag`] is checked between samples; there is no
//! mid-sample cancellation. A cancelled run finalizes normally.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::annotate;
use crate::dataset::{DatasetWriter, SampleRecord};
use crate::error::{DatasetError, PipelineError, RenderError, SceneAccessError};
use crate::randomize::{RandomizationConfig, RandomizationPolicy};
use crate::render::Renderer;
use crate::scene::Scene;

/// Options controlling one generation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of samples to generate
    pub n_samples: usize,
    /// Abort after this many consecutive failed samples
    pub max_consecutive_failures: u32,
    /// Continue numbering after an existing dataset instead of clearing it
    pub incremental: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            n_samples: 1,
            max_consecutive_failures: 5,
            incremental: false,
        }
    }
}

impl RunOptions {
    pub fn new(n_samples: usize) -> Self {
        Self {
            n_samples,
            ..Self::default()
        }
    }

    /// Builder pattern: set the consecutive-failure threshold
    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    /// Builder pattern: enable incremental mode
    pub fn incremental(mut self) -> Self {
        self.incremental = true;
        self
    }
}

/// Driver states, in loop order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Sampling,
    Rendering,
    Extracting,
    Writing,
    Done,
    Aborted,
}

/// Cooperative cancellation flag, checked between pipeline states.
///
/// Clone it before starting the run and trip it from wherever the host
/// surfaces a stop request; the current sample always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop after the current sample
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One skipped sample and why
#[derive(Debug, Clone)]
pub struct SkippedSample {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Indices of samples written to the dataset
    pub written: Vec<usize>,
    /// Samples skipped by per-sample fault isolation
    pub skipped: Vec<SkippedSample>,
    /// Path of the finalized manifest
    pub manifest: Option<PathBuf>,
}

/// Per-sample failure classification.
///
/// Scene and render failures skip the sample; dataset failures are fatal
/// for the run.
enum SampleError {
    Scene(SceneAccessError),
    Render(RenderError),
    Fatal(DatasetError),
}

impl From<SceneAccessError> for SampleError {
    fn from(e: SceneAccessError) -> Self {
        Self::Scene(e)
    }
}

impl From<RenderError> for SampleError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<DatasetError> for SampleError {
    fn from(e: DatasetError) -> Self {
        Self::Fatal(e)
    }
}

/// The generation pipeline.
///
/// Owns the scene, the randomization policy, a renderer, and the dataset
/// writer for the duration of one run.
pub struct Pipeline<R: Renderer> {
    scene: Scene,
    policy: RandomizationPolicy,
    renderer: R,
    writer: DatasetWriter,
    options: RunOptions,
    cancel: CancelFlag,
    state: PipelineState,
    rng: StdRng,
}

impl<R: Renderer> Pipeline<R> {
    /// Creates a pipeline.
    ///
    /// The config is validated here and the output directory prepared;
    /// both happen before any scene mutation or rendering. A config
    /// without a seed gets one drawn once and persisted, so the dataset
    /// remains reproducible either way.
    pub fn new(
        scene: Scene,
        mut config: RandomizationConfig,
        renderer: R,
        output_dir: impl AsRef<Path>,
        options: RunOptions,
    ) -> Result<Self, PipelineError> {
        let seed = *config.seed.get_or_insert_with(rand::random);
        let policy = RandomizationPolicy::new(config)?;
        let writer = DatasetWriter::create(output_dir, options.incremental)?;

        Ok(Self {
            scene,
            policy,
            renderer,
            writer,
            options,
            cancel: CancelFlag::new(),
            state: PipelineState::Idle,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Flag to trip for a stop after the current sample
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Runs the full generation loop and finalizes the dataset.
    ///
    /// # Returns
    /// The run summary on success; [`PipelineError::Aborted`] when the
    /// consecutive-failure threshold was crossed (the manifest is
    /// finalized either way).
    pub fn run(mut self) -> Result<RunSummary, PipelineError> {
        let start = self.writer.start_index();
        let end = start + self.options.n_samples;
        let stats = self.scene.get_statistics();
        info!(
            "generating samples {}..{} ({} objects, {} lights)",
            start, end, stats.object_count, stats.light_count
        );

        let mut summary = RunSummary::default();
        let mut consecutive = 0u32;

        for index in start..end {
            if self.cancel.is_cancelled() {
                info!("cancelled before sample {}", index);
                break;
            }

            // Everything a sample changes is undone afterwards; randomized
            // state never leaks into the next iteration
            let base = self.scene.snapshot();
            let result = self.run_sample(index);
            self.scene.restore(&base);

            match result {
                Ok(()) => {
                    consecutive = 0;
                    summary.written.push(index);
                }
                Err(SampleError::Fatal(e)) => {
                    self.state = PipelineState::Aborted;
                    return Err(e.into());
                }
                Err(e) => {
                    let reason = match e {
                        SampleError::Scene(e) => e.to_string(),
                        SampleError::Render(e) => e.to_string(),
                        SampleError::Fatal(_) => unreachable!(),
                    };
                    warn!("skipping sample {}: {}", index, reason);
                    summary.skipped.push(SkippedSample { index, reason });
                    consecutive += 1;

                    if consecutive >= self.options.max_consecutive_failures {
                        self.state = PipelineState::Aborted;
                        summary.manifest = Some(self.writer.finalize(self.policy.config())?);
                        return Err(PipelineError::Aborted {
                            consecutive,
                            last_index: index,
                            summary,
                        });
                    }
                }
            }
        }

        self.state = PipelineState::Done;
        summary.manifest = Some(self.writer.finalize(self.policy.config())?);
        info!(
            "run finished: {} written, {} skipped",
            summary.written.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// One randomize-render-extract-write cycle
    fn run_sample(&mut self, index: usize) -> Result<(), SampleError> {
        self.state = PipelineState::Sampling;
        let delta = self.policy.sample(&self.scene, &mut self.rng)?;
        self.scene.apply(&delta)?;

        // Render and extraction both observe this snapshot and nothing
        // else; this is the labels-match-pixels invariant
        let snapshot = self.scene.snapshot();

        self.state = PipelineState::Rendering;
        let frame = self.renderer.render(&snapshot)?;

        self.state = PipelineState::Extracting;
        let annotations = annotate::extract(&snapshot);

        self.state = PipelineState::Writing;
        self.writer.write_image(index, &frame)?;
        self.writer.append_record(SampleRecord {
            index,
            image: DatasetWriter::image_rel_path(index),
            annotations: annotations.objects,
            camera: annotations.camera,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::RenderCamera;
    use crate::randomize::{LightRule, ObjectRule, RandomizationConfig};
    use crate::render::{FlatRenderer, RenderedFrame};
    use crate::scene::{Light, Object, SceneSnapshot};
    use cgmath::{Vector3, Zero};
    use tempfile::tempdir;

    fn test_scene() -> Scene {
        let camera = RenderCamera::new(5.0, 0.4, 0.2, Vector3::zero(), (32, 32));
        let mut scene = Scene::new(camera);
        scene.add_material_rgb("red", 1.0, 0.0, 0.0);
        scene.add_material_rgb("green", 0.0, 1.0, 0.0);
        scene.add_object(Object::cube("cube"));
        scene.add_light(Light::new("lamp", 10.0));
        scene
    }

    fn jitter_config(seed: u64) -> RandomizationConfig {
        RandomizationConfig::new()
            .with_seed(seed)
            .with_object(
                ObjectRule::new("cube")
                    .with_location([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])
                    .with_materials(&["red", "green"]),
            )
            .with_light(LightRule::new("lamp").with_power(5.0, 15.0))
    }

    fn read_manifest(path: &Path) -> Vec<SampleRecord> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    /// Fails every sample whose index is in the list, then delegates
    struct FailingRenderer {
        inner: FlatRenderer,
        fail_on: Vec<usize>,
        calls: usize,
    }

    impl FailingRenderer {
        fn new(fail_on: &[usize]) -> Self {
            Self {
                inner: FlatRenderer::new(),
                fail_on: fail_on.to_vec(),
                calls: 0,
            }
        }
    }

    impl Renderer for FailingRenderer {
        fn render(&mut self, snapshot: &SceneSnapshot) -> Result<RenderedFrame, RenderError> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                return Err(RenderError::Failed("injected failure".to_string()));
            }
            self.inner.render(snapshot)
        }
    }

    #[test]
    fn test_seeded_run_writes_expected_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let pipeline = Pipeline::new(
            test_scene(),
            jitter_config(42),
            FlatRenderer::new(),
            &out,
            RunOptions::new(5),
        )
        .unwrap();
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.written, vec![0, 1, 2, 3, 4]);
        assert!(summary.skipped.is_empty());
        for index in 0..5 {
            assert!(out.join(format!("images/{:06}.png", index)).is_file());
        }

        let records = read_manifest(summary.manifest.as_ref().unwrap());
        assert_eq!(records.len(), 5);
        for record in &records {
            let cube = &record.annotations[0];
            // Jitter range [-1, 1] around the origin base position
            for axis in 0..3 {
                assert!(cube.position[axis] >= -1.0 && cube.position[axis] <= 1.0);
            }
        }
        // The config written next to the manifest carries the seed
        let config_text = std::fs::read_to_string(out.join("config.json")).unwrap();
        let config: RandomizationConfig = serde_json::from_str(&config_text).unwrap();
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_same_seed_reproduces_manifest() {
        let dir = tempdir().unwrap();
        let run = |out: PathBuf| {
            let pipeline = Pipeline::new(
                test_scene(),
                jitter_config(7),
                FlatRenderer::new(),
                out,
                RunOptions::new(4),
            )
            .unwrap();
            pipeline.run().unwrap()
        };
        let a = run(dir.path().join("a"));
        let b = run(dir.path().join("b"));
        assert_eq!(
            read_manifest(a.manifest.as_ref().unwrap()),
            read_manifest(b.manifest.as_ref().unwrap())
        );
    }

    #[test]
    fn test_render_failure_skips_sample_and_continues() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let pipeline = Pipeline::new(
            test_scene(),
            jitter_config(42),
            FailingRenderer::new(&[2]),
            &out,
            RunOptions::new(5),
        )
        .unwrap();
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.written, vec![0, 1, 3, 4]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].index, 2);
        assert!(!out.join("images/000002.png").exists());

        let records = read_manifest(summary.manifest.as_ref().unwrap());
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.index != 2));
    }

    #[test]
    fn test_unknown_object_in_config_skips_not_aborts() {
        let dir = tempdir().unwrap();
        let config = jitter_config(1)
            .with_object(ObjectRule::new("ghost").with_location([0.0; 3], [0.0; 3]));
        let pipeline = Pipeline::new(
            test_scene(),
            config,
            FlatRenderer::new(),
            dir.path().join("out"),
            RunOptions::new(2).with_max_consecutive_failures(10),
        )
        .unwrap();
        let summary = pipeline.run().unwrap();
        assert!(summary.written.is_empty());
        assert_eq!(summary.skipped.len(), 2);
    }

    #[test]
    fn test_consecutive_failures_abort_with_finalized_manifest() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let pipeline = Pipeline::new(
            test_scene(),
            jitter_config(42),
            FailingRenderer::new(&[1, 2, 3]),
            &out,
            RunOptions::new(10).with_max_consecutive_failures(3),
        )
        .unwrap();
        let err = pipeline.run().unwrap_err();
        let PipelineError::Aborted {
            consecutive,
            last_index,
            summary,
        } = err
        else {
            panic!("expected abort");
        };
        assert_eq!(consecutive, 3);
        assert_eq!(last_index, 3);
        assert_eq!(summary.written, vec![0]);
        // Manifest was still finalized with the single good sample
        let records = read_manifest(summary.manifest.as_ref().unwrap());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_config_aborts_before_any_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let config = RandomizationConfig::new()
            .with_light(LightRule::new("lamp").with_power(10.0, 1.0));
        let result = Pipeline::new(
            test_scene(),
            config,
            FlatRenderer::new(),
            &out,
            RunOptions::new(3),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
        assert!(!out.exists(), "no files may be written on config error");
    }

    #[test]
    fn test_cancellation_stops_between_samples() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(
            test_scene(),
            jitter_config(42),
            FlatRenderer::new(),
            dir.path().join("out"),
            RunOptions::new(100),
        )
        .unwrap();
        // Tripped before the run starts: nothing is generated, but the
        // manifest is still finalized as a valid empty array
        pipeline.cancel_flag().cancel();
        let summary = pipeline.run().unwrap();
        assert!(summary.written.is_empty());
        let records = read_manifest(summary.manifest.as_ref().unwrap());
        assert!(records.is_empty());
    }

    #[test]
    fn test_incremental_run_extends_numbering() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let first = Pipeline::new(
            test_scene(),
            jitter_config(42),
            FlatRenderer::new(),
            &out,
            RunOptions::new(3),
        )
        .unwrap();
        first.run().unwrap();

        let second = Pipeline::new(
            test_scene(),
            jitter_config(43),
            FlatRenderer::new(),
            &out,
            RunOptions::new(2).incremental(),
        )
        .unwrap();
        let summary = second.run().unwrap();
        assert_eq!(summary.written, vec![3, 4]);
        assert!(out.join("images/000000.png").is_file());
        assert!(out.join("images/000004.png").is_file());
        // The manifest carries both runs
        let records = read_manifest(summary.manifest.as_ref().unwrap());
        assert_eq!(records.len(), 5);
        assert_eq!(records.last().unwrap().index, 4);
    }

    #[test]
    fn test_randomization_does_not_leak_across_samples() {
        let dir = tempdir().unwrap();
        let scene = test_scene();
        let pipeline = Pipeline::new(
            scene,
            jitter_config(42),
            FlatRenderer::new(),
            dir.path().join("out"),
            RunOptions::new(3),
        )
        .unwrap();
        // The scene the pipeline hands back through its accessor is
        // restored between samples; after the run the driver is consumed,
        // so leakage is observable through annotations instead: base
        // positions in the manifest are drawn fresh each sample rather
        // than compounding
        let summary = pipeline.run().unwrap();
        let records = read_manifest(summary.manifest.as_ref().unwrap());
        for record in &records {
            let p = record.annotations[0].position;
            assert!(p.iter().all(|c| (-1.0..=1.0).contains(c)));
        }
    }
}
