use std::path::Path;

use cgmath::{Matrix4, Rad, Vector3};

use crate::error::AssetError;
use crate::scene::material::MaterialId;

/// Object-space axis-aligned bounding box.
///
/// Stands in for full mesh geometry everywhere the pipeline needs the
/// object's extent: placement constraints, projected 2D boxes, and the flat
/// renderer all work from the 8 transformed corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Unit cube from -0.5 to 0.5 on all axes
    pub fn unit_cube() -> Self {
        Self {
            min: Vector3::new(-0.5, -0.5, -0.5),
            max: Vector3::new(0.5, 0.5, 0.5),
        }
    }

    /// The 8 corners in object space
    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }
}

/// A scene object with a TRS pose and an object-space bounding box.
///
/// The object name is its stable identity: annotations carry it as
/// `object_id` across every sample of a run.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    /// Semantic class label written into annotations
    pub class: String,
    pub position: Vector3<f32>,
    /// XYZ euler rotation in radians, applied X then Y then Z
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Material assignment; falls back to the library default when `None`
    pub material_id: Option<MaterialId>,
    /// Hidden objects are excluded from rendering and marked non-visible
    /// in annotations, but keep their per-sample record
    pub visible: bool,
    aabb: Aabb,
}

impl Object {
    /// Creates an object with the given object-space bounding box and an
    /// identity pose
    pub fn new(name: &str, aabb: Aabb) -> Self {
        Self {
            name: name.to_string(),
            class: name.to_string(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            material_id: None,
            visible: true,
            aabb,
        }
    }

    /// Creates a unit cube object
    pub fn cube(name: &str) -> Self {
        Self::new(name, Aabb::unit_cube())
    }

    /// Loads an object from an OBJ file, deriving its bounding box from the
    /// mesh vertices of all contained models.
    pub fn from_obj(name: &str, path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::ObjLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let mut min = Vector3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vector3::new(f32::MIN, f32::MIN, f32::MIN);
        let mut seen = false;
        for model in &models {
            for p in model.mesh.positions.chunks_exact(3) {
                seen = true;
                min.x = min.x.min(p[0]);
                min.y = min.y.min(p[1]);
                min.z = min.z.min(p[2]);
                max.x = max.x.max(p[0]);
                max.y = max.y.max(p[1]);
                max.z = max.z.max(p[2]);
            }
        }
        if !seen {
            return Err(AssetError::EmptyMesh(path.to_path_buf()));
        }

        Ok(Self::new(name, Aabb::new(min, max)))
    }

    /// Builder pattern: set the class label
    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    /// Builder pattern: set the material assignment
    pub fn with_material(mut self, material_id: &str) -> Self {
        self.material_id = Some(material_id.to_string());
        self
    }

    /// Builder pattern: set the position
    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set per-axis scale
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Object-to-world matrix.
    ///
    /// Built as T * Rz * Ry * Rx * S, so scale applies first, then the XYZ
    /// euler rotation (X innermost), then translation. Order matters.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let rx = Matrix4::from_angle_x(Rad(self.rotation.x));
        let ry = Matrix4::from_angle_y(Rad(self.rotation.y));
        let rz = Matrix4::from_angle_z(Rad(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * rz * ry * rx * s
    }

    /// The 8 bounding-box corners transformed into world space
    pub fn world_corners(&self) -> [Vector3<f32>; 8] {
        let m = self.model_matrix();
        self.aabb
            .corners()
            .map(|c| (m * c.extend(1.0)).truncate())
    }

    /// World-space axis-aligned bounds of the transformed box
    pub fn world_bounds(&self) -> Aabb {
        let corners = self.world_corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            min.z = min.z.min(c.z);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
            max.z = max.z.max(c.z);
        }
        Aabb::new(min, max)
    }
}
