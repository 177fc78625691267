//! Spatial primitives for hand and cursor poses
//!
//! Uses a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)

mod camera;
mod point;
mod pose;
mod rotation;
mod vector;

pub use camera::{PerspectiveCamera, ScreenProjector};
pub use point::{Point3D, ScreenPoint};
pub use pose::Pose;
pub use rotation::Quaternion;
pub use vector::Vector3D;
