use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed {field}: expected {expected} space-separated floats, got {got}")]
    MalformedMatrix {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Malformed {field}: {value:?} is not a float")]
    MalformedFloat { field: &'static str, value: String },

    #[error("Camera file has no sensor record")]
    MissingSensor,

    #[error(transparent)]
    Scene(#[from] asp_core::SceneError),
}

impl From<asp_core::ConfigError> for IoError {
    fn from(err: asp_core::ConfigError) -> Self {
        IoError::Scene(err.into())
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
