use crate::camera::RenderCamera;
use crate::error::SceneAccessError;
use crate::randomize::delta::SceneDelta;
use crate::scene::light::Light;
use crate::scene::material::{Material, MaterialManager};
use crate::scene::object::Object;

/// Main scene containing objects, lights, materials, and the camera.
///
/// The scene is the single mutable state of a generation run. The pipeline
/// driver takes logical ownership of it for one sample at a time: apply a
/// randomized delta, snapshot, render and annotate from the snapshot, then
/// restore the pre-sample state so nothing leaks into the next sample.
pub struct Scene {
    pub camera: RenderCamera,
    objects: Vec<Object>,
    lights: Vec<Light>,
    material_manager: MaterialManager,
}

impl Scene {
    /// Creates a new empty scene with the given camera
    pub fn new(camera: RenderCamera) -> Self {
        Self {
            camera,
            objects: Vec::new(),
            lights: Vec::new(),
            material_manager: MaterialManager::new(),
        }
    }

    /// Adds an object to the scene, renaming it if its name is taken
    pub fn add_object(&mut self, mut object: Object) -> &mut Object {
        object.name = self.ensure_unique_name(&object.name);
        self.objects.push(object);
        self.objects.last_mut().unwrap()
    }

    /// Adds a light to the scene
    pub fn add_light(&mut self, light: Light) -> &mut Light {
        self.lights.push(light);
        self.lights.last_mut().unwrap()
    }

    /// Creates a new material and adds it to the material library
    ///
    /// # Arguments
    /// * `name` - Unique name for the material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor
    /// * `roughness` - Roughness factor
    pub fn add_material(
        &mut self,
        name: &str,
        base_color: [f32; 4],
        metallic: f32,
        roughness: f32,
    ) -> &mut Material {
        let material = Material::new(name, base_color, metallic, roughness);
        self.material_manager.add_material(material);
        self.material_manager.get_material_mut(name).unwrap()
    }

    /// Convenience method for creating materials with RGB colors
    pub fn add_material_rgb(&mut self, name: &str, r: f32, g: f32, b: f32) -> &mut Material {
        self.add_material(name, [r, g, b, 1.0], 0.0, 0.5)
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn material_manager(&self) -> &MaterialManager {
        &self.material_manager
    }

    /// Looks up an object by name
    pub fn object(&self, name: &str) -> Result<&Object, SceneAccessError> {
        self.objects
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| SceneAccessError::ObjectNotFound(name.to_string()))
    }

    /// Looks up an object by name for mutation
    pub fn object_mut(&mut self, name: &str) -> Result<&mut Object, SceneAccessError> {
        self.objects
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| SceneAccessError::ObjectNotFound(name.to_string()))
    }

    /// Looks up a light by name
    pub fn light(&self, name: &str) -> Result<&Light, SceneAccessError> {
        self.lights
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| SceneAccessError::LightNotFound(name.to_string()))
    }

    /// Looks up a light by name for mutation
    pub fn light_mut(&mut self, name: &str) -> Result<&mut Light, SceneAccessError> {
        self.lights
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| SceneAccessError::LightNotFound(name.to_string()))
    }

    /// Applies a randomized delta to the scene.
    ///
    /// All-or-nothing: every identifier in the delta is resolved before any
    /// field is mutated, so a failed apply leaves the scene untouched and a
    /// successful one is observed atomically by the renderer.
    pub fn apply(&mut self, delta: &SceneDelta) -> Result<(), SceneAccessError> {
        // Validation pass, no mutation
        for od in &delta.objects {
            self.object(&od.name)?;
            if let Some(material) = &od.material {
                if !self.material_manager.contains(material) {
                    return Err(SceneAccessError::MaterialNotFound(material.clone()));
                }
            }
        }
        for ld in &delta.lights {
            self.light(&ld.name)?;
        }

        // Mutation pass, cannot fail
        for od in &delta.objects {
            let object = self
                .objects
                .iter_mut()
                .find(|o| o.name == od.name)
                .unwrap();
            if let Some(position) = od.position {
                object.position = position;
            }
            if let Some(rotation) = od.rotation_euler {
                object.rotation = rotation;
            }
            if let Some(material) = &od.material {
                object.material_id = Some(material.clone());
            }
        }
        for ld in &delta.lights {
            let light = self.lights.iter_mut().find(|l| l.name == ld.name).unwrap();
            if let Some(power) = ld.power {
                light.power = power;
            }
            if let Some(color) = ld.color {
                light.color = color;
            }
            if let Some(position) = ld.position {
                light.position = position;
            }
        }
        if let Some(cd) = &delta.camera {
            if let Some(distance) = cd.distance {
                self.camera.distance = distance;
            }
            if let Some(pitch) = cd.pitch {
                self.camera.pitch = pitch;
            }
            if let Some(yaw) = cd.yaw {
                self.camera.yaw = yaw;
            }
        }
        Ok(())
    }

    /// Captures the complete dynamic state of the scene.
    ///
    /// The snapshot is what the renderer and the annotation extractor both
    /// consume for one sample, which is how labels stay consistent with
    /// pixels.
    pub fn snapshot(&self) -> SceneSnapshot {
        let colors = self
            .objects
            .iter()
            .map(|o| {
                self.material_manager
                    .get_material_for_object(o.material_id.as_ref())
                    .base_color
            })
            .collect();
        SceneSnapshot {
            camera: self.camera,
            objects: self.objects.clone(),
            lights: self.lights.clone(),
            colors,
        }
    }

    /// Restores the scene to a previously captured snapshot.
    ///
    /// Scene composition (which objects and lights exist) does not change
    /// during a run, so state is written back positionally.
    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        debug_assert_eq!(self.objects.len(), snapshot.objects.len());
        debug_assert_eq!(self.lights.len(), snapshot.lights.len());
        self.camera = snapshot.camera;
        for (object, saved) in self.objects.iter_mut().zip(&snapshot.objects) {
            object.position = saved.position;
            object.rotation = saved.rotation;
            object.scale = saved.scale;
            object.material_id = saved.material_id.clone();
            object.visible = saved.visible;
        }
        for (light, saved) in self.lights.iter_mut().zip(&snapshot.lights) {
            light.position = saved.position;
            light.power = saved.power;
            light.color = saved.color;
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            light_count: self.lights.len(),
            material_count: self.material_manager.list_materials().len(),
        }
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Immutable capture of the scene's dynamic state for one sample.
///
/// Holds everything rendering and annotation need: camera, object poses,
/// lights, and the material base color resolved per object in scene order.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub camera: RenderCamera,
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    colors: Vec<[f32; 4]>,
}

impl SceneSnapshot {
    /// Resolved material base color for the object at `index`
    pub fn object_color(&self, index: usize) -> [f32; 4] {
        self.colors[index]
    }
}

/// Scene statistics for debugging and logging
#[derive(Debug)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub light_count: usize,
    pub material_count: usize,
}
