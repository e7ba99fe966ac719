use crate::api::ApiError;
use crate::schedule::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    ApiError(#[from] ApiError),

    #[error("Projection error: {0}")]
    ProjectionError(#[from] ProjectionError),

    #[error("Key binding error: {0}")]
    KeyBindingError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}
