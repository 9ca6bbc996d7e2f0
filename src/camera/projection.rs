//! World-to-image projection
//!
//! Projects world-space points through the camera into pixel coordinates.
//! Integer pixel coordinates address pixel centers, so the image corners sit
//! at (-0.5, -0.5) and (width - 0.5, height - 0.5). The image y axis points
//! down.

use cgmath::Vector2;
use cgmath::Vector3;

use super::render_camera::RenderCamera;

/// Points closer to the camera plane than this have no stable projection.
const NEAR_EPSILON: f32 = 1e-6;

/// Projects a world-space point into image coordinates.
///
/// Returns `None` for points at or behind the camera plane.
pub fn world_to_image(camera: &RenderCamera, point: Vector3<f32>) -> Option<Vector2<f32>> {
    let view = camera.view_matrix();
    let p = view * point.extend(1.0);

    // look_at_rh looks down -Z, so depth in front of the camera is -z
    let depth = -p.z;
    if depth <= NEAR_EPSILON {
        return None;
    }

    let k = camera.intrinsics();
    let u = k.fx * (p.x / depth) + k.cx;
    let v = k.cy - k.fy * (p.y / depth);
    Some(Vector2::new(u, v))
}

/// Projects a set of world-space points, dropping those behind the camera.
pub fn project_points(camera: &RenderCamera, points: &[Vector3<f32>]) -> Vec<Vector2<f32>> {
    points
        .iter()
        .filter_map(|&p| world_to_image(camera, p))
        .collect()
}

/// True if an image-space point lies inside the image rectangle.
pub fn in_image(camera: &RenderCamera, point: Vector2<f32>) -> bool {
    let (width, height) = camera.resolution;
    point.x >= -0.5
        && point.y >= -0.5
        && point.x < width as f32 - 0.5
        && point.y < height as f32 - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    fn test_camera() -> RenderCamera {
        // Looking straight down the X axis at the origin
        RenderCamera::new(5.0, 0.0, 0.0, Vector3::zero(), (640, 480))
    }

    #[test]
    fn test_target_projects_to_principal_point() {
        let camera = test_camera();
        let p = world_to_image(&camera, Vector3::zero()).unwrap();
        let k = camera.intrinsics();
        assert!((p.x - k.cx).abs() < 1e-3);
        assert!((p.y - k.cy).abs() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera_has_no_projection() {
        let camera = test_camera();
        // Camera eye is at (5, 0, 0); this point is further out on X
        assert!(world_to_image(&camera, Vector3::new(10.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_higher_point_projects_higher_on_image() {
        let camera = test_camera();
        let center = world_to_image(&camera, Vector3::zero()).unwrap();
        let above = world_to_image(&camera, Vector3::new(0.0, 0.0, 0.5)).unwrap();
        // Image y grows downward
        assert!(above.y < center.y);
    }

    #[test]
    fn test_in_image_bounds() {
        let camera = test_camera();
        assert!(in_image(&camera, Vector2::new(0.0, 0.0)));
        assert!(in_image(&camera, Vector2::new(639.4, 479.4)));
        assert!(!in_image(&camera, Vector2::new(-1.0, 10.0)));
        assert!(!in_image(&camera, Vector2::new(639.6, 10.0)));
    }
}
