//! Error types for raster transforms.

use thiserror::Error;

/// Error types for pixel buffer and transform operations.
///
/// Every variant is reported before the live image is touched, so a caller
/// that receives one still holds its original buffer unchanged.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No image is loaded, or the buffer is empty.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// A transform parameter is outside its documented range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The destination buffer could not be allocated.
    ///
    /// `bytes` is `None` when the requested size does not fit in `usize`.
    #[error("Failed to allocate pixel buffer ({})", describe_size(.bytes))]
    AllocationFailure { bytes: Option<usize> },

    /// The operating system refused to start a worker thread.
    #[error("Failed to spawn worker {index}: {source}")]
    WorkerSpawnFailure {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before finishing its row range.
    #[error("Worker {index} panicked")]
    WorkerPanicked { index: usize },
}

fn describe_size(bytes: &Option<usize>) -> String {
    match bytes {
        Some(bytes) => format!("{bytes} bytes"),
        None => "size overflow".to_string(),
    }
}

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::InvalidParameter("kernel size must be odd".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: kernel size must be odd");

        let err = TransformError::AllocationFailure { bytes: Some(48) };
        assert_eq!(err.to_string(), "Failed to allocate pixel buffer (48 bytes)");

        let err = TransformError::AllocationFailure { bytes: None };
        assert_eq!(err.to_string(), "Failed to allocate pixel buffer (size overflow)");
    }

    #[test]
    fn test_spawn_failure_keeps_source() {
        let err = TransformError::WorkerSpawnFailure {
            index: 3,
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left"),
        };
        assert_eq!(err.to_string(), "Failed to spawn worker 3: no threads left");
        assert!(std::error::Error::source(&err).is_some());
    }
}
