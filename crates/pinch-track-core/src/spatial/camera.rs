//! Screen to world projection for touch input

use pinch_track_config::CameraConfig;

use super::{Point3D, Pose, Quaternion, ScreenPoint, Vector3D};

/// A camera that can place a 2D screen point into the world.
pub trait ScreenProjector {
    /// World point under `screen`, `distance` units along the view axis
    fn screen_to_world(&self, screen: ScreenPoint, distance: f32) -> Point3D;

    /// Current camera pose
    fn pose(&self) -> Pose;
}

/// Pinhole camera with a pixel viewport whose origin is the top-left corner.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub pose: Pose,
    /// Vertical field of view in radians
    pub fov: f32,
    pub width: u32,
    pub height: u32,
}

impl PerspectiveCamera {
    pub fn new(width: u32, height: u32, fov_degrees: f32) -> Self {
        Self {
            pose: Pose::default(),
            fov: fov_degrees.to_radians(),
            width,
            height,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Pixel coordinates to normalized device coordinates (-1 to 1, y up)
    fn screen_to_ndc(&self, screen: ScreenPoint) -> (f32, f32) {
        let x_ndc = screen.x / self.width.max(1) as f32 * 2.0 - 1.0;
        let y_ndc = 1.0 - screen.y / self.height.max(1) as f32 * 2.0;
        (x_ndc, y_ndc)
    }
}

impl From<&CameraConfig> for PerspectiveCamera {
    fn from(config: &CameraConfig) -> Self {
        let rotation = Quaternion::look_rotation(Vector3D::from(config.forward), Vector3D::UP);
        Self::new(config.width, config.height, config.fov_degrees)
            .with_pose(Pose::new(Point3D::from(config.position), rotation))
    }
}

impl ScreenProjector for PerspectiveCamera {
    fn screen_to_world(&self, screen: ScreenPoint, distance: f32) -> Point3D {
        let (x_ndc, y_ndc) = self.screen_to_ndc(screen);
        let tan_half_fov = (self.fov / 2.0).tan();
        let local = Point3D::new(
            x_ndc * distance * tan_half_fov * self.aspect(),
            y_ndc * distance * tan_half_fov,
            distance,
        );
        self.pose.transform_point(local)
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_on_axis() {
        let camera = PerspectiveCamera::new(200, 200, 60.0);
        let world = camera.screen_to_world(ScreenPoint::new(100.0, 100.0), 50.0);
        assert!(world.x.abs() < 0.0001);
        assert!(world.y.abs() < 0.0001);
        assert!((world.z - 50.0).abs() < 0.0001);
    }

    #[test]
    fn test_top_left_is_up_and_left() {
        let camera = PerspectiveCamera::new(1280, 720, 90.0);
        let world = camera.screen_to_world(ScreenPoint::new(0.0, 0.0), 10.0);
        assert!(world.x < 0.0);
        assert!(world.y > 0.0);
        // tan(45deg) == 1, so the top edge sits at y == distance
        assert!((world.y - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_rotated_camera_projects_along_its_forward() {
        let camera = PerspectiveCamera::from(&CameraConfig {
            position: [0.0, 1.0, 0.0],
            forward: [1.0, 0.0, 0.0],
            ..CameraConfig::new(100, 100)
        });
        let world = camera.screen_to_world(ScreenPoint::new(50.0, 50.0), 5.0);
        assert!((world.x - 5.0).abs() < 0.0001);
        assert!((world.y - 1.0).abs() < 0.0001);
        assert!(world.z.abs() < 0.0001);
    }
}
