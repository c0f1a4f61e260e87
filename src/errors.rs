use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera initialization error: {0}")]
    InitializationError(String),
    #[error("Preview error: {0}")]
    PreviewError(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<image::ImageError> for CameraError {
    fn from(error: image::ImageError) -> Self {
        CameraError::EncodingError(error.to_string())
    }
}

impl From<config::ConfigError> for CameraError {
    fn from(error: config::ConfigError) -> Self {
        CameraError::ConfigError(error.to_string())
    }
}
