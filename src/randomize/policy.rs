//! Randomization policy
//!
//! Turns a validated [`RandomizationConfig`] into one [`SceneDelta`] per
//! sample. Sampling is a pure function of the RNG state and the config:
//! the same seed and config produce a bit-identical delta sequence, which
//! is what makes datasets reproducible and annotation mismatches
//! debuggable.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{ConfigError, SceneAccessError};
use crate::randomize::config::RandomizationConfig;
use crate::randomize::delta::{CameraDelta, LightDelta, ObjectDelta, SceneDelta};
use crate::randomize::placement::place_objects;
use crate::scene::Scene;

/// Samples per-frame scene deltas from configured distributions.
pub struct RandomizationPolicy {
    config: RandomizationConfig,
}

impl RandomizationPolicy {
    /// Validates the config and wraps it into a policy.
    ///
    /// Range errors surface here, before any rendering or file output.
    pub fn new(config: RandomizationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RandomizationConfig {
        &self.config
    }

    /// Draws the delta for one sample.
    ///
    /// The draw order is fixed (lights, then object rules, then camera,
    /// then constrained placement) so the RNG stream is consumed
    /// identically on every run. Placement runs last and sees the camera
    /// the sample will actually render with; placement deltas for an
    /// object override an earlier object-rule pose for the same name.
    pub fn sample(&self, scene: &Scene, rng: &mut StdRng) -> Result<SceneDelta, SceneAccessError> {
        let mut delta = SceneDelta::default();

        for rule in &self.config.lights {
            let mut ld = LightDelta::new(&rule.name);
            if let Some(range) = &rule.power {
                ld.power = Some(range.sample(rng));
            }
            if let Some(range) = &rule.color {
                let c = range.sample(rng);
                ld.color = Some([c.x, c.y, c.z]);
            }
            if let Some(range) = &rule.location {
                ld.position = Some(range.sample(rng));
            }
            delta.lights.push(ld);
        }

        for rule in &self.config.objects {
            let mut od = ObjectDelta::new(&rule.name);
            if let Some(range) = &rule.location {
                od.position = Some(range.sample(rng));
            }
            if let Some(range) = &rule.rotation_euler {
                od.rotation_euler = Some(range.sample(rng));
            }
            if !rule.materials.is_empty() {
                let pick = rng.random_range(0..rule.materials.len());
                od.material = Some(rule.materials[pick].clone());
            }
            delta.objects.push(od);
        }

        if let Some(rule) = &self.config.camera {
            let mut cd = CameraDelta::default();
            if let Some(range) = &rule.distance {
                cd.distance = Some(range.sample(rng));
            }
            if let Some(range) = &rule.pitch {
                cd.pitch = Some(range.sample(rng));
            }
            if let Some(range) = &rule.yaw {
                cd.yaw = Some(range.sample(rng));
            }
            delta.camera = Some(cd);
        }

        if let Some(rule) = &self.config.placement {
            let mut camera = scene.camera;
            if let Some(cd) = &delta.camera {
                if let Some(distance) = cd.distance {
                    camera.distance = distance;
                }
                if let Some(pitch) = cd.pitch {
                    camera.pitch = pitch;
                }
                if let Some(yaw) = cd.yaw {
                    camera.yaw = yaw;
                }
            }
            let placement = place_objects(scene, &camera, rule, rng)?;
            for name in &placement.unplaced {
                log::debug!("placement exhausted attempts for object '{}'", name);
            }
            delta.objects.extend(placement.deltas);
        }

        Ok(delta)
    }
}
