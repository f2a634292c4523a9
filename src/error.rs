use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Remote cart store unavailable: {0}")]
    TransientStore(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Local cart storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`CartError`], kept by the engine after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransientStore,
    NotFound,
    Validation,
    StorageUnavailable,
    Internal,
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::TransientStore(_) => ErrorKind::TransientStore,
            CartError::NotFound(_) => ErrorKind::NotFound,
            CartError::Validation(_) => ErrorKind::Validation,
            CartError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            CartError::Csv(_) | CartError::Io(_) | CartError::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// True for failures that leave the cart usable and may succeed on a later attempt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}

pub type Result<T, E = CartError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            CartError::TransientStore("timeout".into()).kind(),
            ErrorKind::TransientStore
        );
        assert_eq!(
            CartError::NotFound("Item not found in cart".into()).kind(),
            ErrorKind::NotFound
        );
        let io = CartError::from(std::io::Error::other("boom"));
        assert_eq!(io.kind(), ErrorKind::Internal);
        assert!(!io.is_recoverable());
        assert!(CartError::StorageUnavailable("quota".into()).is_recoverable());
    }
}
