use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by key-value backends regardless of where values live.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable context.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A value could not be encoded before being written.
    #[error("failed to encode value for key `{key}`")]
    Encode {
        /// Key being written.
        key: &'static str,
        /// Serializer failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
