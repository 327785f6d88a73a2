use thiserror::Error;

/// Common errors across the scene geometry engine
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Coordinate transform error: {0}")]
    Coordinate(#[from] CoordinateError),
}

/// Fatal construction-time errors. A scene with a bad transform or a
/// bad sensor is never built; queries assume validated inputs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Rotation matrix is not orthonormal (max deviation {0})")]
    NonOrthonormalRotation(f64),

    #[error("Scale must be positive, got {0}")]
    NonPositiveScale(f64),

    #[error("Sensor resolution must be positive, got {0}x{1}")]
    InvalidResolution(u32, u32),

    #[error("Sensor focal lengths must be positive, got fx={0} fy={1}")]
    InvalidIntrinsics(f64, f64),
}

#[derive(Error, Debug)]
pub enum CoordinateError {
    #[error("Invalid latitude: {0} (must be -90 to 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be -180 to 180)")]
    InvalidLongitude(f64),
}

pub type Result<T> = std::result::Result<T, SceneError>;
