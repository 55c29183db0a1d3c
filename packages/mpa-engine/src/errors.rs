//! Error types for mpa-engine
//!
//! Provides unified error handling across the crate. Configuration problems
//! have their own [`ConfigError`](crate::config::ConfigError) which converts
//! into [`MpaError::Config`].

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for mpa-engine operations
#[derive(Debug, Error)]
pub enum MpaError {
    /// Invalid configuration (bad YAML, out-of-range value, conflicting options)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An analysis was assembled from incompatible parts
    #[error("Invalid analysis: {0}")]
    InvalidAnalysis(String),

    /// Composite values with a different number of components than the analysis
    #[error("Component count mismatch: expected {expected}, found {found}")]
    ComponentCountMismatch { expected: usize, found: usize },

    /// A component transfer relation failed
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// API misuse, e.g. asking a non-target state for its violated properties
    #[error("Usage error: {0}")]
    Usage(String),

    /// A partitioning could not be produced or is inconsistent
    #[error("Partitioning error: {0}")]
    Partitioning(String),

    /// An internal invariant of the restart loop was broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// External shutdown request
    #[error("Analysis shut down: {0}")]
    Shutdown(String),

    /// A resource limit could not be installed
    #[error("Resource limit error: {0}")]
    ResourceLimit(String),

    /// Operation not supported by an abstract domain
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl MpaError {
    /// Create an invalid-analysis error
    pub fn invalid_analysis(msg: impl Into<String>) -> Self {
        MpaError::InvalidAnalysis(msg.into())
    }

    /// Create a transfer error
    pub fn transfer(msg: impl Into<String>) -> Self {
        MpaError::Transfer(msg.into())
    }

    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        MpaError::Usage(msg.into())
    }

    /// Create a partitioning error
    pub fn partitioning(msg: impl Into<String>) -> Self {
        MpaError::Partitioning(msg.into())
    }

    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        MpaError::InvariantViolation(msg.into())
    }

    /// Create an unsupported-operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        MpaError::Unsupported(msg.into())
    }

    /// Create a configuration error from a plain message
    pub fn config(msg: impl Into<String>) -> Self {
        MpaError::Config(ConfigError::Custom(msg.into()))
    }

    /// Check that a composite value has the expected arity
    pub fn check_arity(expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(MpaError::ComponentCountMismatch { expected, found })
        }
    }
}

/// Result type alias for mpa-engine operations
pub type Result<T> = std::result::Result<T, MpaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_arity() {
        assert!(MpaError::check_arity(3, 3).is_ok());
        let err = MpaError::check_arity(3, 2).unwrap_err();
        assert!(matches!(
            err,
            MpaError::ComponentCountMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_config_error_converts() {
        let err: MpaError = ConfigError::MissingVersion.into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
