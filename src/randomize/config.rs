//! Randomization configuration
//!
//! The config is plain data with serde support so it can be loaded from
//! JSON and versioned alongside the generated manifest. All ranges are
//! validated once at load time; an invalid range aborts the run before any
//! rendering or file output happens.

use std::path::Path;

use cgmath::Vector3;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive uniform range over a scalar parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field: field.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Draws a uniform sample from the range
    pub fn sample(&self, rng: &mut StdRng) -> f32 {
        if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// Inclusive uniform range over a 3-component parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range3 {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Range3 {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Degenerate range pinning all components to one value
    pub fn fixed(value: [f32; 3]) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), ConfigError> {
        for axis in 0..3 {
            if self.min[axis] > self.max[axis] {
                return Err(ConfigError::InvalidRange {
                    field: format!("{}[{}]", field, axis),
                    min: self.min[axis],
                    max: self.max[axis],
                });
            }
        }
        Ok(())
    }

    /// Draws one uniform sample per component
    pub fn sample(&self, rng: &mut StdRng) -> Vector3<f32> {
        let mut out = [0.0f32; 3];
        for axis in 0..3 {
            out[axis] = Range::new(self.min[axis], self.max[axis]).sample(rng);
        }
        Vector3::new(out[0], out[1], out[2])
    }
}

/// Per-object randomization rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRule {
    pub name: String,
    #[serde(default)]
    pub location: Option<Range3>,
    /// XYZ euler rotation range in radians
    #[serde(default)]
    pub rotation_euler: Option<Range3>,
    /// Material pool to pick from; empty leaves the assignment alone
    #[serde(default)]
    pub materials: Vec<String>,
}

impl ObjectRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: None,
            rotation_euler: None,
            materials: Vec::new(),
        }
    }

    /// Builder pattern: set the location range
    pub fn with_location(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.location = Some(Range3::new(min, max));
        self
    }

    /// Builder pattern: set the rotation range (radians)
    pub fn with_rotation(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.rotation_euler = Some(Range3::new(min, max));
        self
    }

    /// Builder pattern: set the material pool
    pub fn with_materials(mut self, materials: &[&str]) -> Self {
        self.materials = materials.iter().map(|m| m.to_string()).collect();
        self
    }
}

/// Per-light randomization rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRule {
    pub name: String,
    #[serde(default)]
    pub power: Option<Range>,
    /// RGB color range
    #[serde(default)]
    pub color: Option<Range3>,
    #[serde(default)]
    pub location: Option<Range3>,
}

impl LightRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            power: None,
            color: None,
            location: None,
        }
    }

    /// Builder pattern: set the power range
    pub fn with_power(mut self, min: f32, max: f32) -> Self {
        self.power = Some(Range::new(min, max));
        self
    }

    /// Builder pattern: set the color range
    pub fn with_color(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.color = Some(Range3::new(min, max));
        self
    }

    /// Builder pattern: set the location range
    pub fn with_location(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.location = Some(Range3::new(min, max));
        self
    }
}

/// Camera orbit randomization rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CameraRule {
    #[serde(default)]
    pub distance: Option<Range>,
    /// Elevation range in radians
    #[serde(default)]
    pub pitch: Option<Range>,
    /// Azimuth range in radians
    #[serde(default)]
    pub yaw: Option<Range>,
}

impl CameraRule {
    /// Builder pattern: set the distance range
    pub fn with_distance(mut self, min: f32, max: f32) -> Self {
        self.distance = Some(Range::new(min, max));
        self
    }

    /// Builder pattern: set the pitch range (radians)
    pub fn with_pitch(mut self, min: f32, max: f32) -> Self {
        self.pitch = Some(Range::new(min, max));
        self
    }

    /// Builder pattern: set the yaw range (radians)
    pub fn with_yaw(mut self, min: f32, max: f32) -> Self {
        self.yaw = Some(Range::new(min, max));
        self
    }
}

fn default_attempts() -> u32 {
    100
}

/// Constrained multi-object placement rule.
///
/// Objects are placed one after another, each drawing fresh poses until all
/// enabled checks pass or the attempt budget runs out. Objects that cannot
/// be placed are parked at `far_away` when set, otherwise left at their
/// current pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    /// Names of the objects to place, in placement order
    pub objects: Vec<String>,
    pub location: Range3,
    #[serde(default)]
    pub rotation_euler: Option<Range3>,
    /// World-space bounds the transformed bounding box must stay inside
    #[serde(default)]
    pub bounds: Option<Range3>,
    /// Reject poses whose projected hull overlaps an already placed one
    #[serde(default)]
    pub prevent_overlap_2d: bool,
    /// Reject poses with more than this many projected corners outside the
    /// image
    #[serde(default)]
    pub max_corners_outside_image: Option<usize>,
    /// Parking position for objects that could not be placed
    #[serde(default)]
    pub far_away: Option<[f32; 3]>,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

impl PlacementRule {
    pub fn new(objects: &[&str], location: Range3) -> Self {
        Self {
            objects: objects.iter().map(|o| o.to_string()).collect(),
            location,
            rotation_euler: None,
            bounds: None,
            prevent_overlap_2d: false,
            max_corners_outside_image: None,
            far_away: None,
            attempts: default_attempts(),
        }
    }
}

/// Complete randomization configuration for a run.
///
/// The seed is explicit and persisted with the dataset so a run can be
/// regenerated exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RandomizationConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub objects: Vec<ObjectRule>,
    #[serde(default)]
    pub lights: Vec<LightRule>,
    #[serde(default)]
    pub camera: Option<CameraRule>,
    #[serde(default)]
    pub placement: Option<PlacementRule>,
}

impl RandomizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: add an object rule
    pub fn with_object(mut self, rule: ObjectRule) -> Self {
        self.objects.push(rule);
        self
    }

    /// Builder pattern: add a light rule
    pub fn with_light(mut self, rule: LightRule) -> Self {
        self.lights.push(rule);
        self
    }

    /// Builder pattern: set the camera rule
    pub fn with_camera(mut self, rule: CameraRule) -> Self {
        self.camera = Some(rule);
        self
    }

    /// Builder pattern: set the placement rule
    pub fn with_placement(mut self, rule: PlacementRule) -> Self {
        self.placement = Some(rule);
        self
    }

    /// Loads a config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every range in the config.
    ///
    /// Called once when the pipeline is constructed, never per sample.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.objects {
            if let Some(r) = &rule.location {
                r.validate(&format!("objects.{}.location", rule.name))?;
            }
            if let Some(r) = &rule.rotation_euler {
                r.validate(&format!("objects.{}.rotation_euler", rule.name))?;
            }
        }
        for rule in &self.lights {
            if let Some(r) = &rule.power {
                r.validate(&format!("lights.{}.power", rule.name))?;
            }
            if let Some(r) = &rule.color {
                r.validate(&format!("lights.{}.color", rule.name))?;
            }
            if let Some(r) = &rule.location {
                r.validate(&format!("lights.{}.location", rule.name))?;
            }
        }
        if let Some(rule) = &self.camera {
            if let Some(r) = &rule.distance {
                r.validate("camera.distance")?;
            }
            if let Some(r) = &rule.pitch {
                r.validate("camera.pitch")?;
            }
            if let Some(r) = &rule.yaw {
                r.validate("camera.yaw")?;
            }
        }
        if let Some(rule) = &self.placement {
            rule.location.validate("placement.location")?;
            if let Some(r) = &rule.rotation_euler {
                r.validate("placement.rotation_euler")?;
            }
            if let Some(r) = &rule.bounds {
                r.validate("placement.bounds")?;
            }
            if rule.attempts == 0 {
                return Err(ConfigError::ZeroAttempts);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_invalid_range_is_rejected_at_load() {
        let config = RandomizationConfig::new().with_object(
            ObjectRule::new("cube").with_location([1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]),
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn test_degenerate_range_samples_its_single_value() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = Range::new(2.5, 2.5);
        assert_eq!(range.sample(&mut rng), 2.5);
    }

    #[test]
    fn test_range3_sample_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = Range3::new([-1.0, -2.0, 0.0], [1.0, 2.0, 0.5]);
        for _ in 0..100 {
            let v = range.sample(&mut rng);
            assert!(v.x >= -1.0 && v.x <= 1.0);
            assert!(v.y >= -2.0 && v.y <= 2.0);
            assert!(v.z >= 0.0 && v.z <= 0.5);
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = RandomizationConfig::new()
            .with_seed(42)
            .with_object(
                ObjectRule::new("cube1")
                    .with_location([-0.1, -0.1, 0.05], [0.1, 0.1, 0.15])
                    .with_materials(&["red", "green"]),
            )
            .with_light(LightRule::new("light").with_power(5.0, 15.0))
            .with_camera(CameraRule::default().with_distance(3.0, 6.0));
        let text = serde_json::to_string(&config).unwrap();
        let parsed: RandomizationConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let mut rule = PlacementRule::new(&["a"], Range3::fixed([0.0, 0.0, 0.0]));
        rule.attempts = 0;
        let config = RandomizationConfig::new().with_placement(rule);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroAttempts)));
    }
}
