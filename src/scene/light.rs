use cgmath::Vector3;

/// A point light in the scene.
///
/// Only the parameters the randomizer and renderer consume are modeled:
/// position, power and color. Power is in arbitrary energy units matching
/// the host renderer's convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub position: Vector3<f32>,
    pub power: f32,
    pub color: [f32; 3],
}

impl Light {
    pub fn new(name: &str, power: f32) -> Self {
        Self {
            name: name.to_string(),
            position: Vector3::new(0.0, 0.0, 1.0),
            power,
            color: [1.0, 1.0, 1.0],
        }
    }

    /// Builder pattern: set the light position
    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set the RGB color
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r, g, b];
        self
    }
}
