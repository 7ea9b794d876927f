use thiserror::Error;

use crate::registry::CameraKey;

pub type Result<T> = std::result::Result<T, AwsmTaaError>;

#[derive(Error, Debug)]
pub enum AwsmTaaError {
    #[error("[taa] camera {0:?} was released or never registered")]
    StaleCamera(CameraKey),

    #[error("[taa] history size must be non-zero, got {width}x{height}")]
    ZeroSizedHistory { width: u32, height: u32 },

    #[error("[taa] camera {0:?} has no history allocated")]
    MissingHistory(CameraKey),

    #[error("[taa] history backend: {0}")]
    Backend(String),
}

impl AwsmTaaError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}
