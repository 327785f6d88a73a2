//! Calibrated survey cameras and forward projection

mod distortion;

pub use distortion::Distortion;

use std::sync::Arc;

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use rayon::prelude::*;

use crate::error::ConfigError;

/// Physical sensor shared by every camera in a flight
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    width: u32,
    height: u32,
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
    distortion: Distortion,
}

impl Sensor {
    /// Validate and build a sensor. Zero resolution or non-positive
    /// focal lengths are configuration errors here, not at query time.
    pub fn new(
        width: u32,
        height: u32,
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        distortion: Distortion,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidResolution(width, height));
        }
        if !(fx > 0.0) || !(fy > 0.0) {
            return Err(ConfigError::InvalidIntrinsics(fx, fy));
        }

        Ok(Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            distortion,
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn focal_length(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }

    pub fn principal_point(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    pub fn distortion(&self) -> &Distortion {
        &self.distortion
    }
}

/// A posed survey camera.
///
/// The pose maps local-frame points into the camera frame. Position
/// and orientation axes are derived from the pose's inverse rotation
/// block once, at construction; cameras are immutable after load.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: Matrix4<f64>,
    sensor: Arc<Sensor>,
    image: String,
    index: usize,
    position: Vector3<f64>,
    orientation: Matrix3<f64>,
}

impl Camera {
    pub fn new(pose: Matrix4<f64>, sensor: Arc<Sensor>, image: String, index: usize) -> Self {
        let rotation_inv = pose.fixed_view::<3, 3>(0, 0).transpose();
        let t = Vector3::new(pose[(0, 3)], pose[(1, 3)], pose[(2, 3)]);

        Self {
            pose,
            sensor,
            image,
            index,
            position: -(rotation_inv * t),
            orientation: rotation_inv,
        }
    }

    pub fn pose(&self) -> &Matrix4<f64> {
        &self.pose
    }

    pub fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Camera center in the local frame
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn right(&self) -> Vector3<f64> {
        self.orientation.column(0).into()
    }

    pub fn up(&self) -> Vector3<f64> {
        self.orientation.column(1).into()
    }

    pub fn look(&self) -> Vector3<f64> {
        self.orientation.column(2).into()
    }

    pub fn width(&self) -> u32 {
        self.sensor.resolution().0
    }

    pub fn height(&self) -> u32 {
        self.sensor.resolution().1
    }

    /// Whether a pixel lies inside `[0, W) x [0, H)`
    pub fn contains(&self, u: f64, v: f64) -> bool {
        u >= 0.0 && v >= 0.0 && u < self.width() as f64 && v < self.height() as f64
    }

    /// Project a local-frame point to distorted pixel coordinates.
    ///
    /// Points at or behind the camera plane are not visible and
    /// return `None`. The order is fixed: homogeneous multiply,
    /// perspective divide, distort, then scale to pixels.
    pub fn project(&self, point: &Vector3<f64>) -> Option<(f64, f64)> {
        let cam = self.pose * Vector4::new(point.x, point.y, point.z, 1.0);
        if cam.z <= 0.0 {
            return None;
        }

        let x_norm = cam.x / cam.z;
        let y_norm = cam.y / cam.z;

        let (x_dist, y_dist) = self.sensor.distortion().distort(x_norm, y_norm);

        let (fx, fy) = self.sensor.focal_length();
        let (cx, cy) = self.sensor.principal_point();

        Some((cx + fx * x_dist, cy + fy * y_dist))
    }

    /// Project a batch of points, index-aligned with the input.
    ///
    /// Pure and deterministic; points are independent, so the batch
    /// runs in parallel.
    pub fn project_points(&self, points: &[Vector3<f64>]) -> Vec<Option<(f64, f64)>> {
        points.par_iter().map(|p| self.project(p)).collect()
    }
}
