//! Built-in CPU renderer
//!
//! Paints each object's projected convex hull with its flat material color,
//! modulated by the scene lights, in back-to-front painter's order. It is
//! not a substitute for a host render engine, but it is deterministic,
//! dependency-free, and produces frames whose silhouettes agree exactly
//! with the derived annotations, which makes it the reference renderer for
//! tests and standalone dataset runs.

use cgmath::InnerSpace;

use crate::camera::projection::project_points;
use crate::error::RenderError;
use crate::render::raster::{convex_hull, scan_hull};
use crate::render::{RenderedFrame, Renderer};
use crate::scene::SceneSnapshot;

/// Light power that maps to full surface brightness
const REFERENCE_POWER: f32 = 10.0;

/// Flat-shaded preview renderer.
pub struct FlatRenderer {
    pub background: [u8; 4],
}

impl FlatRenderer {
    pub fn new() -> Self {
        Self {
            background: [24, 24, 28, 255],
        }
    }

    /// Builder pattern: set the background color
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = rgba;
        self
    }

    /// Combined light tint for the frame: average color scaled by total
    /// power relative to the reference, clamped to a sane range.
    fn light_tint(snapshot: &SceneSnapshot) -> [f32; 3] {
        if snapshot.lights.is_empty() {
            return [1.0, 1.0, 1.0];
        }
        let mut color = [0.0f32; 3];
        let mut power = 0.0f32;
        for light in &snapshot.lights {
            for (c, lc) in color.iter_mut().zip(light.color.iter()) {
                *c += lc;
            }
            power += light.power;
        }
        let n = snapshot.lights.len() as f32;
        let brightness = (power / REFERENCE_POWER).clamp(0.15, 1.0);
        [
            color[0] / n * brightness,
            color[1] / n * brightness,
            color[2] / n * brightness,
        ]
    }
}

impl Default for FlatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for FlatRenderer {
    fn render(&mut self, snapshot: &SceneSnapshot) -> Result<RenderedFrame, RenderError> {
        let (width, height) = snapshot.camera.resolution;
        if width == 0 || height == 0 {
            return Err(RenderError::Failed(format!(
                "degenerate resolution {}x{}",
                width, height
            )));
        }

        let mut frame = RenderedFrame::filled(width, height, self.background);
        let tint = Self::light_tint(snapshot);
        let eye = snapshot.camera.eye();

        // Painter's order: far objects first so near ones overwrite them
        let mut order: Vec<usize> = (0..snapshot.objects.len()).collect();
        order.sort_by(|&a, &b| {
            let da = (snapshot.objects[a].position - eye).magnitude2();
            let db = (snapshot.objects[b].position - eye).magnitude2();
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });

        for index in order {
            let object = &snapshot.objects[index];
            if !object.visible {
                continue;
            }

            // Corners behind the camera are dropped; good enough for a
            // silhouette pass
            let projected = project_points(&snapshot.camera, &object.world_corners());
            let hull = convex_hull(&projected);
            if hull.len() < 3 {
                continue;
            }

            let base = snapshot.object_color(index);
            let rgba = [
                ((base[0] * tint[0]).clamp(0.0, 1.0) * 255.0) as u8,
                ((base[1] * tint[1]).clamp(0.0, 1.0) * 255.0) as u8,
                ((base[2] * tint[2]).clamp(0.0, 1.0) * 255.0) as u8,
                (base[3].clamp(0.0, 1.0) * 255.0) as u8,
            ];
            scan_hull(&hull, width, height, |x, y| frame.put(x, y, rgba));
        }

        Ok(frame)
    }
}
