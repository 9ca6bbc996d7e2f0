//! Constrained multi-object placement
//!
//! Places a group of objects by rejection sampling: each object draws
//! candidate poses until every enabled check passes or the attempt budget
//! runs out. Checks run against the same projection the annotations use,
//! so "no overlap on the image" means no overlap between the projected
//! convex hulls that end up in the dataset.

use cgmath::{Vector2, Vector3};
use rand::rngs::StdRng;

use crate::camera::projection::{in_image, world_to_image};
use crate::camera::RenderCamera;
use crate::error::SceneAccessError;
use crate::randomize::config::PlacementRule;
use crate::randomize::delta::ObjectDelta;
use crate::render::raster::{convex_hull, hulls_intersect};
use crate::scene::Scene;

/// Outcome of one placement pass
#[derive(Debug)]
pub(crate) struct Placement {
    pub deltas: Vec<ObjectDelta>,
    /// Names of objects that exhausted their attempt budget
    pub unplaced: Vec<String>,
}

/// Places the rule's objects one after another.
///
/// `camera` is the camera the sample will render with (orbit deltas already
/// applied), not necessarily the scene's current camera.
pub(crate) fn place_objects(
    scene: &Scene,
    camera: &RenderCamera,
    rule: &PlacementRule,
    rng: &mut StdRng,
) -> Result<Placement, SceneAccessError> {
    let mut placed_hulls: Vec<Vec<Vector2<f32>>> = Vec::new();
    let mut deltas = Vec::new();
    let mut unplaced = Vec::new();

    for name in &rule.objects {
        // Trial poses are evaluated on a scratch copy of the object
        let mut candidate = scene.object(name)?.clone();
        let mut accepted = false;

        for _ in 0..rule.attempts {
            candidate.position = rule.location.sample(rng);
            if let Some(rotation) = &rule.rotation_euler {
                candidate.rotation = rotation.sample(rng);
            }

            let corners = candidate.world_corners();

            if let Some(bounds) = &rule.bounds {
                let b = candidate.world_bounds();
                let lo = Vector3::new(bounds.min[0], bounds.min[1], bounds.min[2]);
                let hi = Vector3::new(bounds.max[0], bounds.max[1], bounds.max[2]);
                let inside = b.min.x >= lo.x
                    && b.min.y >= lo.y
                    && b.min.z >= lo.z
                    && b.max.x <= hi.x
                    && b.max.y <= hi.y
                    && b.max.z <= hi.z;
                if !inside {
                    continue;
                }
            }

            let mut projected = Vec::with_capacity(8);
            let mut outside = 0usize;
            for corner in corners {
                match world_to_image(camera, corner) {
                    Some(p) => {
                        if !in_image(camera, p) {
                            outside += 1;
                        }
                        projected.push(p);
                    }
                    // Corners behind the camera count as outside
                    None => outside += 1,
                }
            }

            if let Some(max_outside) = rule.max_corners_outside_image {
                if outside > max_outside {
                    continue;
                }
            }

            let hull = convex_hull(&projected);

            if rule.prevent_overlap_2d
                && placed_hulls.iter().any(|other| hulls_intersect(&hull, other))
            {
                continue;
            }

            placed_hulls.push(hull);
            deltas.push(ObjectDelta {
                name: name.clone(),
                position: Some(candidate.position),
                rotation_euler: Some(candidate.rotation),
                material: None,
            });
            accepted = true;
            break;
        }

        if !accepted {
            unplaced.push(name.clone());
            if let Some(far_away) = rule.far_away {
                deltas.push(ObjectDelta {
                    name: name.clone(),
                    position: Some(Vector3::new(far_away[0], far_away[1], far_away[2])),
                    rotation_euler: None,
                    material: None,
                });
            }
        }
    }

    Ok(Placement { deltas, unplaced })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomize::config::Range3;
    use crate::scene::Object;
    use cgmath::Zero;
    use rand::SeedableRng;

    fn test_scene() -> Scene {
        let camera = RenderCamera::new(8.0, 0.5, 0.3, Vector3::zero(), (128, 128));
        let mut scene = Scene::new(camera);
        scene.add_object(Object::cube("a"));
        scene.add_object(Object::cube("b"));
        scene
    }

    #[test]
    fn test_unknown_object_is_a_scene_access_error() {
        let scene = test_scene();
        let rule = PlacementRule::new(&["ghost"], Range3::fixed([0.0, 0.0, 0.0]));
        let mut rng = StdRng::seed_from_u64(1);
        let err = place_objects(&scene, &scene.camera, &rule, &mut rng).unwrap_err();
        assert!(matches!(err, SceneAccessError::ObjectNotFound(_)));
    }

    #[test]
    fn test_overlap_prevention_separates_hulls() {
        let scene = test_scene();
        let mut rule = PlacementRule::new(
            &["a", "b"],
            Range3::new([-2.0, -2.0, 0.0], [2.0, 2.0, 0.0]),
        );
        rule.prevent_overlap_2d = true;
        let mut rng = StdRng::seed_from_u64(3);
        let placement = place_objects(&scene, &scene.camera, &rule, &mut rng).unwrap();
        assert_eq!(placement.deltas.len(), 2);
        assert!(placement.unplaced.is_empty());

        // Re-derive the hulls from the accepted poses and check disjointness
        let mut hulls = Vec::new();
        for delta in &placement.deltas {
            let mut object = scene.object(&delta.name).unwrap().clone();
            object.position = delta.position.unwrap();
            object.rotation = delta.rotation_euler.unwrap();
            let projected: Vec<_> = object
                .world_corners()
                .iter()
                .filter_map(|&c| world_to_image(&scene.camera, c))
                .collect();
            hulls.push(convex_hull(&projected));
        }
        assert!(!hulls_intersect(&hulls[0], &hulls[1]));
    }

    #[test]
    fn test_impossible_placement_parks_far_away() {
        let scene = test_scene();
        // Both objects forced onto the exact same spot; overlap prevention
        // makes the second placement impossible
        let mut rule = PlacementRule::new(&["a", "b"], Range3::fixed([0.0, 0.0, 0.0]));
        rule.prevent_overlap_2d = true;
        rule.attempts = 5;
        rule.far_away = Some([100.0, 100.0, 100.0]);
        let mut rng = StdRng::seed_from_u64(3);
        let placement = place_objects(&scene, &scene.camera, &rule, &mut rng).unwrap();
        assert_eq!(placement.unplaced, vec!["b".to_string()]);
        let parked = placement.deltas.iter().find(|d| d.name == "b").unwrap();
        assert_eq!(parked.position.unwrap(), Vector3::new(100.0, 100.0, 100.0));
    }

    #[test]
    fn test_bounds_are_respected() {
        let scene = test_scene();
        let mut rule = PlacementRule::new(
            &["a"],
            Range3::new([-5.0, -5.0, 0.0], [5.0, 5.0, 0.0]),
        );
        rule.bounds = Some(Range3::new([-2.0, -2.0, -1.0], [2.0, 2.0, 1.0]));
        let mut rng = StdRng::seed_from_u64(9);
        let placement = place_objects(&scene, &scene.camera, &rule, &mut rng).unwrap();
        if let Some(delta) = placement.deltas.first() {
            let p = delta.position.unwrap();
            // Half-extent of the unit cube keeps centers within 1.5
            assert!(p.x.abs() <= 1.5 && p.y.abs() <= 1.5);
        } else {
            panic!("placement failed entirely");
        }
    }
}
