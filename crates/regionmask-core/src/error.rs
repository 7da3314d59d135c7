//! Editor error types.

use thiserror::Error;

/// Errors reported by editor operations.
///
/// All of these are local and recoverable: a rejected operation leaves the
/// editor state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Index {index} out of range (length {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("No background image has been loaded yet")]
    NotReady,
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Layer is {actual:?}, canvas is {expected:?}")]
    LayerSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
