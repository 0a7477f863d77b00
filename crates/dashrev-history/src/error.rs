//! Error types for the revision history controller

use thiserror::Error;

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Backend operation that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetching a page of the revision log
    FetchRevisions,
    /// Fetching a diff between two versions
    FetchDiff,
    /// Restoring an earlier version
    Restore,
}

impl Operation {
    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchRevisions => "fetch revisions",
            Operation::FetchDiff => "fetch diff",
            Operation::Restore => "restore",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the history controller
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    /// A backend request failed
    #[error("{operation} failed: {message}")]
    Network {
        operation: Operation,
        message: String,
    },

    /// The backend answered with an empty result where one was required
    #[error("{0} returned an empty result")]
    EmptyResponse(Operation),

    /// The current selection cannot be compared
    #[error("Selection is not comparable: {0:?}")]
    NotComparable(Vec<u32>),

    /// A restore is already executing
    #[error("A restore to version {0} is already in progress")]
    RestoreInProgress(u32),

    /// A newer request of the same kind replaced this one before it resolved
    #[error("{0} was superseded by a newer request")]
    Superseded(Operation),

    /// No loaded revision carries this version
    #[error("Revision not found: version {0}")]
    RevisionNotFound(u32),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HistoryError {
    /// Create a network error for an operation
    pub fn network(operation: Operation, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error belongs to the network failure class surfaced to the user
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::EmptyResponse(_))
    }

    /// Human readable detail shown in the notification body
    pub fn detail(&self) -> String {
        match self {
            Self::Network { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<config::ConfigError> for HistoryError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let err = HistoryError::network(Operation::FetchDiff, "connection refused");
        assert_eq!(err.to_string(), "fetch diff failed: connection refused");
        assert_eq!(err.detail(), "connection refused");
        assert!(err.is_network_failure());
    }

    #[test]
    fn test_validation_gap_is_not_network_failure() {
        let err = HistoryError::NotComparable(vec![6]);
        assert!(!err.is_network_failure());
    }

    #[test]
    fn test_empty_response_is_network_failure() {
        let err = HistoryError::EmptyResponse(Operation::Restore);
        assert_eq!(err.to_string(), "restore returned an empty result");
        assert!(err.is_network_failure());
    }
}
