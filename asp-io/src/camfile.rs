//! Camera-file records as served by the plan API
//!
//! One file carries the shared sensor calibration, every camera's
//! flattened pose, and the scene's ECEF-to-ENU similarity transform.

use std::io::Read;
use std::sync::Arc;

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::Deserialize;

use asp_core::{Camera, Distortion, Sensor, SimilarityTransform};

use crate::error::{IoError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CameraFile {
    pub sensors: Vec<SensorRecord>,
    pub cameras: Vec<CameraRecord>,
    pub transform: TransformRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorRecord {
    pub resolution: Resolution,
    pub calibration: Calibration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Intrinsics plus distortion; coefficients the calibration never
/// estimated are simply absent and default to zero
#[derive(Debug, Clone, Deserialize)]
pub struct Calibration {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    #[serde(default)]
    pub k1: f64,
    #[serde(default)]
    pub k2: f64,
    #[serde(default)]
    pub k3: f64,
    #[serde(default)]
    pub k4: f64,
    #[serde(default)]
    pub p1: f64,
    #[serde(default)]
    pub p2: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraRecord {
    /// Flattened 4x4 pose, 16 space-separated floats, row-major
    pub transform: String,
    pub image: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Serialized similarity transform: 9 rotation floats, 3 translation
/// floats, one scale
#[derive(Debug, Clone, Deserialize)]
pub struct TransformRecord {
    pub rotation: String,
    pub translation: String,
    pub scale: f64,
}

impl CameraFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TransformRecord {
    pub fn to_similarity(&self) -> Result<SimilarityTransform> {
        let r = parse_floats("transform.rotation", &self.rotation, 9)?;
        let t = parse_floats("transform.translation", &self.translation, 3)?;

        let rotation = Matrix3::from_row_slice(&r);
        let translation = Vector3::new(t[0], t[1], t[2]);

        Ok(SimilarityTransform::new(rotation, self.scale, translation)?)
    }
}

/// Everything the geometry engine needs from one camera file
#[derive(Debug, Clone)]
pub struct SceneBundle {
    pub sensor: Arc<Sensor>,
    pub cameras: Vec<Camera>,
    pub transform: SimilarityTransform,
}

/// Build core scene types from a decoded camera file.
///
/// The first sensor record is the flight's shared physical sensor.
/// Disabled cameras are skipped entirely and consume no index.
pub fn build_scene(file: &CameraFile) -> Result<SceneBundle> {
    let record = file.sensors.first().ok_or(IoError::MissingSensor)?;
    let cal = &record.calibration;

    let sensor = Arc::new(Sensor::new(
        record.resolution.width,
        record.resolution.height,
        cal.fx,
        cal.fy,
        cal.cx,
        cal.cy,
        Distortion {
            k1: cal.k1,
            k2: cal.k2,
            k3: cal.k3,
            k4: cal.k4,
            p1: cal.p1,
            p2: cal.p2,
        },
    )?);

    let mut cameras = Vec::new();
    for record in &file.cameras {
        if !record.enabled {
            continue;
        }
        let pose = parse_floats("camera.transform", &record.transform, 16)?;
        cameras.push(Camera::new(
            Matrix4::from_row_slice(&pose),
            Arc::clone(&sensor),
            record.image.clone(),
            cameras.len(),
        ));
    }

    log::info!(
        "camera file: {} cameras ({} disabled)",
        cameras.len(),
        file.cameras.len() - cameras.len()
    );

    let transform = file.transform.to_similarity()?;

    Ok(SceneBundle {
        sensor,
        cameras,
        transform,
    })
}

fn parse_floats(field: &'static str, s: &str, expected: usize) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(expected);
    for token in s.split_whitespace() {
        let value = token.parse().map_err(|_| IoError::MalformedFloat {
            field,
            value: token.to_string(),
        })?;
        values.push(value);
    }

    if values.len() != expected {
        return Err(IoError::MalformedMatrix {
            field,
            expected,
            got: values.len(),
        });
    }
    Ok(values)
}
