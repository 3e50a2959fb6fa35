//! Error types and handling for the `TripFlow` aggregation core

use thiserror::Error;

/// Main error type for the `TripFlow` application
#[derive(Error, Debug)]
pub enum TripFlowError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed caller input (bad email, empty line items, bad trip fields)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A single provider fetch failed or timed out. Recorded per category in
    /// `AggregationResult::errors`; never aborts the surrounding aggregation.
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// The summarization collaborator failed. `transient` marks failures
    /// that are worth retrying with backoff.
    #[error("Upstream error: {message}")]
    Upstream { message: String, transient: bool },

    /// Retries against a transient upstream failure were exhausted
    #[error("Orchestration failed: {message}")]
    Orchestration { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripFlowError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S, transient: bool) -> Self {
        Self::Upstream {
            message: message.into(),
            transient,
        }
    }

    /// Create a new orchestration error
    pub fn orchestration<S: Into<String>>(message: S) -> Self {
        Self::Orchestration {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripFlowError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripFlowError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripFlowError::Provider { .. } => {
                "One of our travel data partners is unreachable. Partial results may be available."
                    .to_string()
            }
            TripFlowError::Upstream { .. } => {
                "The itinerary service is having trouble right now. Please try again.".to_string()
            }
            TripFlowError::Orchestration { .. } => {
                "We could not finish planning your trip. Please try again in a moment.".to_string()
            }
            TripFlowError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripFlowError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TripFlowError::config("missing API key");
        assert!(matches!(config_err, TripFlowError::Config { .. }));

        let provider_err = TripFlowError::provider("connection failed");
        assert!(matches!(provider_err, TripFlowError::Provider { .. }));

        let validation_err = TripFlowError::validation("empty item list");
        assert!(matches!(validation_err, TripFlowError::Validation { .. }));

        let upstream_err = TripFlowError::upstream("503 Service Unavailable", true);
        assert!(matches!(
            upstream_err,
            TripFlowError::Upstream {
                transient: true,
                ..
            }
        ));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TripFlowError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let validation_err = TripFlowError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let orchestration_err = TripFlowError::orchestration("summarizer gave up");
        assert!(orchestration_err.user_message().contains("try again"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let trip_err: TripFlowError = io_err.into();
        assert!(matches!(trip_err, TripFlowError::Io { .. }));
    }
}
