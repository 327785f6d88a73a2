use nalgebra::Vector3;

use crate::error::{CoordinateError, Result};

/// Geodetic coordinates on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lla {
    pub lat: f64, // degrees
    pub lon: f64, // degrees
    pub alt: f64, // meters above the ellipsoid
}

// WGS84 ellipsoid parameters
const WGS84_A: f64 = 6378137.0; // semi-major axis (meters)
const WGS84_E2: f64 = 0.00669437999014; // first eccentricity squared

/// Convert geodetic coordinates to ECEF
pub fn lla_to_ecef(lla: &Lla) -> Result<Vector3<f64>> {
    if lla.lat < -90.0 || lla.lat > 90.0 {
        return Err(CoordinateError::InvalidLatitude(lla.lat).into());
    }

    let lat_rad = lla.lat.to_radians();
    let lon_rad = lla.lon.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    let x = (n + lla.alt) * cos_lat * lon_rad.cos();
    let y = (n + lla.alt) * cos_lat * lon_rad.sin();
    let z = (n * (1.0 - WGS84_E2) + lla.alt) * sin_lat;

    Ok(Vector3::new(x, y, z))
}

/// Convert ECEF coordinates to geodetic, iterating for latitude
/// and altitude
pub fn ecef_to_lla(ecef: &Vector3<f64>) -> Result<Lla> {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();

    let lon = ecef.y.atan2(ecef.x).to_degrees();

    let mut lat = (ecef.z / p).atan();
    let mut alt = 0.0;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        alt = p / lat.cos() - n;
        lat = (ecef.z / p / (1.0 - WGS84_E2 * n / (n + alt))).atan();
    }

    let lat_deg = lat.to_degrees();
    if !(-90.0..=90.0).contains(&lat_deg) {
        return Err(CoordinateError::InvalidLatitude(lat_deg).into());
    }

    Ok(Lla {
        lat: lat_deg,
        lon,
        alt,
    })
}
