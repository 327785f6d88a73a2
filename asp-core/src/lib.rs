pub mod camera;
pub mod cloud;
pub mod coordinate;
pub mod error;
pub mod mask;
pub mod polygon;

pub use camera::{Camera, Distortion, Sensor};
pub use cloud::{CloudPoint, PointCloud};
pub use coordinate::{Lla, SimilarityTransform, ecef_to_lla, lla_to_ecef};
pub use error::{ConfigError, CoordinateError, Result, SceneError};
pub use mask::Mask;
pub use polygon::Polygon;
