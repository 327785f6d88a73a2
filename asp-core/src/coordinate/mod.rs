//! Coordinate system transformations
//!
//! Geodetic (lat/lon/alt) points are carried through ECEF into the
//! scene's local East-North-Up frame by a per-scene similarity
//! transform, and back out the same way.

mod geodetic;
mod similarity;

pub use geodetic::{Lla, ecef_to_lla, lla_to_ecef};
pub use similarity::SimilarityTransform;
