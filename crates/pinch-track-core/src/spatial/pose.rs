//! Position plus orientation of a tracked joint or camera

use serde::{Deserialize, Serialize};

use super::{Point3D, Quaternion, Vector3D};

/// World-space pose. Fingertips and cameras carry no scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3D,
    pub rotation: Quaternion,
}

impl Pose {
    pub fn new(position: Point3D, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation
    pub fn from_position(position: Point3D) -> Self {
        Self::new(position, Quaternion::IDENTITY)
    }

    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    pub fn up(&self) -> Vector3D {
        self.rotation.up()
    }

    /// Map a point from this pose's local space into world space
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        self.position + self.rotation.rotate_vector(local - Point3D::ORIGIN)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Point3D::ORIGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_point_translates() {
        let pose = Pose::from_position(Point3D::new(10.0, 0.0, 0.0));
        let world = pose.transform_point(Point3D::new(1.0, 2.0, 3.0));
        assert_eq!(world, Point3D::new(11.0, 2.0, 3.0));
    }
}
