//! Typed interface boundary for scene artifacts
//!
//! Decodes the records an upstream plan service hands us (camera
//! file, scene transform, point records, segmentation masks, geodetic
//! polygons) into `asp-core` types. Fetching and caching those
//! artifacts is someone else's problem; everything here operates on
//! already-downloaded bytes.

pub mod camfile;
pub mod error;
pub mod geo;
pub mod mask;
pub mod points;

pub use camfile::{CameraFile, SceneBundle, TransformRecord, build_scene};
pub use error::{IoError, Result};
pub use geo::{GeoVertex, polygon_to_local, ray_cast_geodetic};
pub use mask::{load_mask, mask_from_luma};
pub use points::{GeodeticPointRecord, LocalPointRecord, cloud_from_geodetic, cloud_from_local};

// Re-export from asp-core for convenience
pub use asp_core::{Camera, PointCloud, Sensor, SimilarityTransform};
