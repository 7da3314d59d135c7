//! Host error types.

use regionmask_core::EditorError;
use thiserror::Error;

/// Errors raised while replaying a session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

/// Result type for host operations.
pub type AppResult<T> = Result<T, AppError>;
