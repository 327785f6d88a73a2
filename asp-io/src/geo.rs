//! Geodetic plumbing for the annotation layer: survey-area polygons
//! arrive as lat/lng vertex lists and single ray-cast results leave
//! as lat/lng points.

use serde::Deserialize;

use asp_core::{Camera, Lla, PointCloud, Polygon, SimilarityTransform};

use crate::error::Result;

/// One polygon vertex as the upstream annotation JSON spells it
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoVertex {
    pub lng: f64,
    pub lat: f64,
}

/// Map a geodetic polygon into the local frame (altitude 0), keeping
/// only x/y for the 2-D containment tests.
pub fn polygon_to_local(
    vertices: &[GeoVertex],
    transform: &SimilarityTransform,
) -> Result<Polygon> {
    let geodetic: Vec<Lla> = vertices
        .iter()
        .map(|v| Lla {
            lat: v.lat,
            lon: v.lng,
            alt: 0.0,
        })
        .collect();

    let local = transform.geodetic_to_local(&geodetic)?;
    Ok(Polygon::new(
        local.iter().map(|p| p.xy()).collect(),
    ))
}

/// Resolve a pixel to a geodetic point: ray cast into the cloud, then
/// lift the local-frame estimate back to lat/lng/alt.
///
/// `Ok(None)` means the ray did not hit any points; the annotation
/// layer must skip it rather than place a marker.
pub fn ray_cast_geodetic(
    cloud: &PointCloud,
    camera: &Camera,
    pixel: (f64, f64),
    transform: &SimilarityTransform,
) -> Result<Option<Lla>> {
    let Some(local) = cloud.ray_cast(camera, pixel) else {
        log::debug!("ray cast at ({:.1}, {:.1}) hit no points", pixel.0, pixel.1);
        return Ok(None);
    };

    let geodetic = transform.local_to_geodetic(std::slice::from_ref(&local))?;
    Ok(geodetic.into_iter().next())
}
