use cgmath::Vector3;

use crate::scene::MaterialId;

/// The set of parameter changes applied to the scene for one sample.
///
/// Produced by the randomization policy, consumed atomically by
/// [`Scene::apply`](crate::scene::Scene::apply). Fields left as `None`
/// keep their current scene value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDelta {
    pub objects: Vec<ObjectDelta>,
    pub lights: Vec<LightDelta>,
    pub camera: Option<CameraDelta>,
}

impl SceneDelta {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.lights.is_empty() && self.camera.is_none()
    }
}

/// Pose and material changes for one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDelta {
    pub name: String,
    pub position: Option<Vector3<f32>>,
    /// XYZ euler rotation in radians
    pub rotation_euler: Option<Vector3<f32>>,
    pub material: Option<MaterialId>,
}

impl ObjectDelta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: None,
            rotation_euler: None,
            material: None,
        }
    }
}

/// Parameter changes for one light
#[derive(Debug, Clone, PartialEq)]
pub struct LightDelta {
    pub name: String,
    pub power: Option<f32>,
    pub color: Option<[f32; 3]>,
    pub position: Option<Vector3<f32>>,
}

impl LightDelta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            power: None,
            color: None,
            position: None,
        }
    }
}

/// Orbit parameter changes for the camera
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraDelta {
    pub distance: Option<f32>,
    pub pitch: Option<f32>,
    pub yaw: Option<f32>,
}
