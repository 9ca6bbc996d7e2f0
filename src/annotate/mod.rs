//! # Annotation Module
//!
//! Derives structured ground truth from the same [`SceneSnapshot`] the
//! renderer consumed, which is the core correctness invariant of the whole
//! pipeline: labels and pixels must agree. Nothing here reads the live
//! scene.
//!
//! Per object and frame:
//!
//! - `bbox` - axis-aligned 2D bounding box of the projected bounding-box
//!   corners, clipped to the image; `null` when nothing projects on screen
//! - `position` - world-space translation
//! - `visible` - occlusion-aware flag: the object must contribute at least
//!   one pixel to an object-index map painted back-to-front from the same
//!   snapshot
//!
//! Every object appears in every frame's record, visible or not, so
//! object identity (`object_id` = scene object name) is stable across
//! samples.

use cgmath::InnerSpace;
use serde::{Deserialize, Serialize};

use crate::camera::projection::world_to_image;
use crate::camera::Intrinsics;
use crate::render::raster::{convex_hull, ObjectMap};
use crate::scene::SceneSnapshot;

/// Ground truth for one object in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAnnotation {
    pub object_id: String,
    pub class: String,
    /// `[x_min, y_min, x_max, y_max]` in pixels, or `None` off-screen
    pub bbox: Option<[f32; 4]>,
    pub position: [f32; 3],
    pub visible: bool,
}

/// Camera parameters recorded with each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraAnnotation {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub intrinsics: Intrinsics,
    pub resolution: [u32; 2],
}

/// All ground truth derived from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotations {
    pub objects: Vec<ObjectAnnotation>,
    pub camera: CameraAnnotation,
}

/// Extracts annotations from a snapshot.
///
/// Must be called with the exact snapshot that was rendered for the
/// sample; the driver guarantees this by snapshotting once per iteration.
pub fn extract(snapshot: &SceneSnapshot) -> FrameAnnotations {
    let camera = &snapshot.camera;
    let (width, height) = camera.resolution;
    let eye = camera.eye();

    // Projected hull per object, None when nothing is in front of the
    // camera
    let hulls: Vec<Option<Vec<cgmath::Vector2<f32>>>> = snapshot
        .objects
        .iter()
        .map(|object| {
            if !object.visible {
                return None;
            }
            let projected: Vec<_> = object
                .world_corners()
                .iter()
                .filter_map(|&c| world_to_image(camera, c))
                .collect();
            if projected.is_empty() {
                None
            } else {
                Some(projected)
            }
        })
        .collect();

    // Occlusion map: paint back-to-front so each pixel ends up with the
    // nearest object, mirroring what the render shows
    let mut map = ObjectMap::new(width, height);
    let mut order: Vec<usize> = (0..snapshot.objects.len()).collect();
    order.sort_by(|&a, &b| {
        let da = (snapshot.objects[a].position - eye).magnitude2();
        let db = (snapshot.objects[b].position - eye).magnitude2();
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &index in &order {
        if let Some(points) = &hulls[index] {
            let hull = convex_hull(points);
            map.fill_hull(&hull, index as u32 + 1);
        }
    }

    let objects = snapshot
        .objects
        .iter()
        .enumerate()
        .map(|(index, object)| {
            let bbox = hulls[index].as_ref().and_then(|points| {
                let mut x_min = f32::MAX;
                let mut y_min = f32::MAX;
                let mut x_max = f32::MIN;
                let mut y_max = f32::MIN;
                for p in points {
                    x_min = x_min.min(p.x);
                    y_min = y_min.min(p.y);
                    x_max = x_max.max(p.x);
                    y_max = y_max.max(p.y);
                }
                // Clip to the image; a box that ends up empty is off-screen
                let x_min = x_min.max(0.0);
                let y_min = y_min.max(0.0);
                let x_max = x_max.min(width as f32 - 1.0);
                let y_max = y_max.min(height as f32 - 1.0);
                if x_min > x_max || y_min > y_max {
                    None
                } else {
                    Some([x_min, y_min, x_max, y_max])
                }
            });

            ObjectAnnotation {
                object_id: object.name.clone(),
                class: object.class.clone(),
                bbox,
                position: [object.position.x, object.position.y, object.position.z],
                visible: map.contains_id(index as u32 + 1),
            }
        })
        .collect();

    FrameAnnotations {
        objects,
        camera: CameraAnnotation {
            eye: [eye.x, eye.y, eye.z],
            target: [camera.target.x, camera.target.y, camera.target.z],
            intrinsics: camera.intrinsics(),
            resolution: [width, height],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::RenderCamera;
    use crate::scene::{Object, Scene};
    use cgmath::{Vector3, Zero};

    fn test_scene() -> Scene {
        let camera = RenderCamera::new(5.0, 0.3, 0.3, Vector3::zero(), (64, 64));
        Scene::new(camera)
    }

    #[test]
    fn test_centered_object_is_visible_with_bbox() {
        let mut scene = test_scene();
        scene.add_object(Object::cube("cube"));
        let frame = extract(&scene.snapshot());
        let ann = &frame.objects[0];
        assert!(ann.visible);
        let bbox = ann.bbox.unwrap();
        assert!(bbox[0] < bbox[2] && bbox[1] < bbox[3]);
        assert!(bbox[0] >= 0.0 && bbox[3] <= 63.0);
    }

    #[test]
    fn test_offscreen_object_keeps_record_without_bbox() {
        let mut scene = test_scene();
        scene.add_object(Object::cube("gone").at(Vector3::new(0.0, 0.0, -500.0)));
        let frame = extract(&scene.snapshot());
        let ann = &frame.objects[0];
        assert_eq!(ann.object_id, "gone");
        assert!(!ann.visible);
        assert!(ann.bbox.is_none());
    }

    #[test]
    fn test_fully_occluded_object_is_not_visible() {
        let mut scene = test_scene();
        scene.add_object(Object::cube("small").with_scale(Vector3::new(0.2, 0.2, 0.2)));
        // A much larger cube between the camera and the small one
        let eye = scene.camera.eye();
        scene.add_object(
            Object::cube("blocker")
                .at(eye * 0.5)
                .with_scale(Vector3::new(3.0, 3.0, 3.0)),
        );
        let frame = extract(&scene.snapshot());
        let small = frame.objects.iter().find(|a| a.object_id == "small").unwrap();
        let blocker = frame.objects.iter().find(|a| a.object_id == "blocker").unwrap();
        assert!(blocker.visible);
        assert!(!small.visible, "occluded object must be marked non-visible");
        // The record itself survives, bbox included
        assert!(small.bbox.is_some());
    }

    #[test]
    fn test_annotation_positions_match_snapshot() {
        let mut scene = test_scene();
        scene.add_object(Object::cube("cube").at(Vector3::new(0.25, -0.5, 0.1)));
        let snapshot = scene.snapshot();
        // Mutating the live scene after the snapshot must not affect the
        // extraction
        scene.object_mut("cube").unwrap().position = Vector3::zero();
        let frame = extract(&snapshot);
        assert_eq!(frame.objects[0].position, [0.25, -0.5, 0.1]);
    }

    #[test]
    fn test_camera_record_matches_snapshot_camera() {
        let scene = test_scene();
        let frame = extract(&scene.snapshot());
        assert_eq!(frame.camera.resolution, [64, 64]);
        let eye = scene.camera.eye();
        assert!((frame.camera.eye[0] - eye.x).abs() < 1e-6);
    }
}
