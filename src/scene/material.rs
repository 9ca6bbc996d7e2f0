//! Material library
//!
//! Flat-shaded material definitions with centralized management. Materials
//! are stored in [`MaterialManager`] and objects reference them by ID, so
//! the randomizer can reassign materials per sample without copying data.

use std::collections::HashMap;

/// Material ID for referencing materials
pub type MaterialId = String;

/// Material definition with basic PBR properties
///
/// Only the surface parameters that survive into annotations and the flat
/// renderer are kept; there is no GPU state here.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

impl Material {
    /// Creates a new material
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Builder pattern: set base color from RGB values
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b, self.base_color[3]];
        self
    }

    /// Builder pattern: set alpha transparency
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.base_color[3] = alpha.clamp(0.0, 1.0);
        self
    }
}

/// Centralized storage for all materials.
///
/// Objects reference materials by ID rather than storing material data
/// directly. Lookups for unassigned or unknown IDs fall back to the default
/// material.
#[derive(Debug, Clone)]
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let mut manager = Self {
            materials: HashMap::new(),
            default_material_id: "default".to_string(),
        };
        manager.materials.insert("default".to_string(), Material::default());
        manager
    }

    /// Adds a material to the library, keyed by its name
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Gets a material by ID
    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Gets a mutable material by ID
    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        &self.materials[&self.default_material_id]
    }

    /// Gets the material for an object with fallback to default
    ///
    /// Handles objects with no assignment and assignments that no longer
    /// resolve to a registered material.
    pub fn get_material_for_object(&self, material_id: Option<&MaterialId>) -> &Material {
        match material_id {
            Some(id) => self
                .get_material(id)
                .unwrap_or_else(|| self.get_default_material()),
            None => self.get_default_material(),
        }
    }

    /// True if the ID resolves to a registered material
    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}
