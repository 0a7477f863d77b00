use dashrev_history::HistoryError;
use dashrev_http::HttpError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Server unreachable: {0}")]
    Unreachable(String),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the controller already showed this failure as a notification
    pub fn already_reported(&self) -> bool {
        matches!(self, CliError::History(e) if e.is_network_failure())
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {message}\n\nRun 'dashrev --help' for usage information.")
            }
            CliError::Io(e) => format!("Terminal I/O failed: {e}"),
            CliError::Config(msg) | CliError::History(HistoryError::Config(msg)) => {
                format!("Configuration error: {msg}\n\nCheck the [history] and [http] sections of your config file.")
            }
            CliError::History(HistoryError::RevisionNotFound(version)) => {
                format!("Version {version} is not in the revision history of this dashboard.")
            }
            CliError::History(e) => e.to_string(),
            CliError::Http(e) => format!("HTTP client setup failed: {e}\n\nCheck http.base_url in your config file."),
            CliError::Unreachable(msg) => format!("Could not reach the dashboard server: {msg}"),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_not_found_message() {
        let err = CliError::from(HistoryError::RevisionNotFound(12));
        assert_eq!(
            err.user_message(),
            "Version 12 is not in the revision history of this dashboard."
        );
    }

    #[test]
    fn test_network_failures_are_reported_by_publisher() {
        let err = CliError::from(HistoryError::network(
            dashrev_history::Operation::FetchDiff,
            "DiffError",
        ));
        assert!(err.already_reported());
        assert!(!CliError::Unreachable("refused".into()).already_reported());
    }

    #[test]
    fn test_config_errors_share_message() {
        let err = CliError::from(HistoryError::config("page_size must be greater than 0"));
        assert!(err.user_message().starts_with("Configuration error: page_size"));
    }
}
