//! Decoded point records and their conversion into a local-frame
//! point cloud

use serde::Deserialize;

use asp_core::{CloudPoint, Lla, PointCloud, SimilarityTransform};

use crate::error::Result;

/// One exported survey point in geodetic coordinates
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeodeticPointRecord {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// One point already in the scene's local frame
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocalPointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Convert geodetic point records into a local-frame cloud, carrying
/// each point's color across the transform.
pub fn cloud_from_geodetic(
    records: &[GeodeticPointRecord],
    transform: &SimilarityTransform,
) -> Result<PointCloud> {
    log::info!("converting {} geodetic points to the local frame", records.len());

    let geodetic: Vec<Lla> = records
        .iter()
        .map(|r| Lla {
            lat: r.lat,
            lon: r.lon,
            alt: r.alt,
        })
        .collect();
    let local = transform.geodetic_to_local(&geodetic)?;

    let points = local
        .into_iter()
        .zip(records)
        .map(|(position, r)| CloudPoint {
            position,
            color: [r.red, r.green, r.blue],
        })
        .collect();

    Ok(PointCloud::new(points))
}

/// Wrap already-local point records in a cloud
pub fn cloud_from_local(records: &[LocalPointRecord]) -> PointCloud {
    log::debug!("loading {} local-frame points", records.len());

    PointCloud::new(
        records
            .iter()
            .map(|r| CloudPoint {
                position: nalgebra::Vector3::new(r.x, r.y, r.z),
                color: [r.red, r.green, r.blue],
            })
            .collect(),
    )
}
