use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

use super::geodetic::{Lla, ecef_to_lla, lla_to_ecef};
use crate::error::{ConfigError, Result};

// Tolerance on |R·Rᵗ - I| when validating the rotation block
const ORTHONORMAL_TOL: f64 = 1e-6;

/// Per-scene similarity transform anchoring the local East-North-Up
/// frame to ECEF.
///
/// Maps `ecef = R·S·enu + T` and back as `enu = Rᵗ·(1/S)·(ecef - T)`.
/// Built once when a scene is loaded and immutable afterwards; the
/// inverse rotation and scale are cached at construction.
#[derive(Debug, Clone)]
pub struct SimilarityTransform {
    rotation: Matrix3<f64>,
    rotation_inv: Matrix3<f64>,
    scale: f64,
    scale_inv: f64,
    translation: Vector3<f64>,
}

impl SimilarityTransform {
    /// Validate and build a similarity transform.
    ///
    /// The rotation must be orthonormal and the scale strictly
    /// positive; violations are configuration errors here, never at
    /// query time.
    pub fn new(
        rotation: Matrix3<f64>,
        scale: f64,
        translation: Vector3<f64>,
    ) -> std::result::Result<Self, ConfigError> {
        if !(scale > 0.0) {
            return Err(ConfigError::NonPositiveScale(scale));
        }

        let deviation = (rotation * rotation.transpose() - Matrix3::identity()).abs().max();
        if deviation > ORTHONORMAL_TOL {
            return Err(ConfigError::NonOrthonormalRotation(deviation));
        }

        Ok(Self {
            rotation,
            rotation_inv: rotation.transpose(),
            scale,
            scale_inv: 1.0 / scale,
            translation,
        })
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// ECEF to local ENU: `Rᵗ·(1/S)·(ecef - T)`
    pub fn ecef_to_local(&self, ecef: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_inv * ((ecef - self.translation) * self.scale_inv)
    }

    /// Local ENU to ECEF: `R·S·local + T`
    pub fn local_to_ecef(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * (local * self.scale) + self.translation
    }

    /// Convert a batch of geodetic points into the local frame.
    ///
    /// Behaves identically for any batch size, including one.
    pub fn geodetic_to_local(&self, points: &[Lla]) -> Result<Vec<Vector3<f64>>> {
        points
            .par_iter()
            .map(|lla| {
                let ecef = lla_to_ecef(lla)?;
                Ok(self.ecef_to_local(&ecef))
            })
            .collect()
    }

    /// Convert a batch of local-frame points back to geodetic
    /// coordinates.
    pub fn local_to_geodetic(&self, points: &[Vector3<f64>]) -> Result<Vec<Lla>> {
        points
            .par_iter()
            .map(|local| {
                let ecef = self.local_to_ecef(local);
                ecef_to_lla(&ecef)
            })
            .collect()
    }
}
