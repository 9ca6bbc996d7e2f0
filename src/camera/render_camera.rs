use cgmath::{Matrix4, Point3, Vector3};
use cgmath::EuclideanSpace;
use serde::{Deserialize, Serialize};

/// Pinhole camera used for rendering and annotation.
///
/// Extrinsics use an orbit parameterization: the camera sits at `distance`
/// from `target`, rotated by `pitch` (elevation) and `yaw` (azimuth), with
/// the scene Z axis as up. Intrinsics follow the physical-camera model:
/// focal length and sensor width in millimetres plus an output resolution
/// in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCamera {
    pub distance: f32,
    /// Elevation above the target's XY plane, radians.
    pub pitch: f32,
    /// Azimuth around the Z axis, radians.
    pub yaw: f32,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Focal length in millimetres.
    pub focal_length: f32,
    /// Sensor width in millimetres.
    pub sensor_width: f32,
    /// Output image size in pixels (width, height).
    pub resolution: (u32, u32),
}

impl RenderCamera {
    /// Creates a camera orbiting `target` with default full-frame optics
    /// (50mm lens on a 36mm sensor).
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, resolution: (u32, u32)) -> Self {
        Self {
            distance,
            pitch,
            yaw,
            target,
            up: Vector3::unit_z(),
            focal_length: 50.0,
            sensor_width: 36.0,
            resolution,
        }
    }

    /// Builder pattern: set focal length and sensor width in millimetres
    pub fn with_optics(mut self, focal_length: f32, sensor_width: f32) -> Self {
        self.focal_length = focal_length;
        self.sensor_width = sensor_width;
        self
    }

    /// Camera position in world space, computed from the orbit parameters
    pub fn eye(&self) -> Vector3<f32> {
        // Spherical to cartesian, Z-up
        Vector3::new(
            self.distance * self.yaw.cos() * self.pitch.cos(),
            self.distance * self.yaw.sin() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
        ) + self.target
    }

    /// World-to-camera matrix. The camera looks down its local -Z axis.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye());
        let target = Point3::from_vec(self.target);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    /// Pixel-space intrinsics derived from the physical parameters.
    ///
    /// Square pixels are assumed, so `fy == fx`. The principal point sits at
    /// the image center with integer pixel coordinates at pixel centers,
    /// i.e. `(size - 1) / 2`.
    pub fn intrinsics(&self) -> Intrinsics {
        let (width, height) = self.resolution;
        let fx = self.focal_length / self.sensor_width * width as f32;
        Intrinsics {
            fx,
            fy: fx,
            cx: (width as f32 - 1.0) / 2.0,
            cy: (height as f32 - 1.0) / 2.0,
        }
    }
}

/// Pixel-space camera intrinsics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Zero};

    #[test]
    fn test_intrinsics_from_optics() {
        let camera = RenderCamera::new(5.0, 0.0, 0.0, Vector3::zero(), (640, 480))
            .with_optics(50.0, 36.0);
        let k = camera.intrinsics();
        assert!((k.fx - 50.0 / 36.0 * 640.0).abs() < 1e-3);
        assert_eq!(k.fx, k.fy);
        assert_eq!(k.cx, 319.5);
        assert_eq!(k.cy, 239.5);
    }

    #[test]
    fn test_eye_respects_distance() {
        let camera = RenderCamera::new(5.0, 0.4, 0.2, Vector3::new(1.0, 2.0, 3.0), (640, 480));
        let offset = camera.eye() - camera.target;
        assert!((offset.magnitude() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_eye_straight_up_at_half_pi_pitch() {
        let camera = RenderCamera::new(2.0, std::f32::consts::FRAC_PI_2, 0.0, Vector3::zero(), (64, 64));
        let eye = camera.eye();
        assert!(eye.x.abs() < 1e-4);
        assert!(eye.y.abs() < 1e-4);
        assert!((eye.z - 2.0).abs() < 1e-4);
    }
}
