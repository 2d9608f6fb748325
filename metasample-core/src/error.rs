//! Error types for the sampling engine.

use thiserror::Error;

/// Main error type for sampling operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// Malformed or missing category/relation records, or unusable tunables.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// More selections were requested than the finite domain holds.
    #[error("Sample size exceeded: requested {requested} but the domain holds {available}")]
    SampleSizeExceeded { requested: usize, available: usize },

    /// A category id outside `1..=categories` reached the allocator.
    #[error("Invalid category {id} (catalog has {categories} categories)")]
    InvalidCategory { id: usize, categories: usize },

    /// An argument no sampler accepts, such as a zero count for ART.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl SamplingError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SamplingError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether the caller can recover by changing the request.
    ///
    /// `InvalidCategory` is a contract breach inside the allocator and
    /// configuration errors are fatal to the sampler instance.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SamplingError::SampleSizeExceeded { .. } | SamplingError::InvalidArgument { .. }
        )
    }
}

/// Result type for sampling operations.
pub type Result<T> = std::result::Result<T, SamplingError>;
