//! Errors returned by the geocoding and weather clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification used by callers that only care about the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, DNS, connection or non-2xx answer.
    Network,
    /// The service answered but the body did not have the expected shape.
    Parse,
    /// The request could not be built from what the caller supplied.
    Input,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("{0} response contained no data")]
    Empty(&'static str),

    #[error("Location '{0}' has no coordinates")]
    MissingCoordinates(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::Status { .. } => FailureKind::Network,
            Self::Parse { .. } | Self::Empty(_) => FailureKind::Parse,
            Self::MissingCoordinates(_) => FailureKind::Input,
        }
    }

    /// User-facing message for display next to the lookup result.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) if e.is_timeout() => {
                "The weather service took too long to answer.".to_string()
            }
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN =>
            {
                "The service rejected the configured API key.".to_string()
            }
            Self::Status { service, status, .. } if *status == StatusCode::TOO_MANY_REQUESTS => {
                format!("Too many requests to {service}. Try again later.")
            }
            Self::Status { service, status, .. } => {
                format!("{service} answered with status {status}.")
            }
            Self::Parse { service, .. } => format!("Unexpected response from {service}."),
            Self::Empty(_) => "No weather data available for this location.".to_string(),
            Self::MissingCoordinates(name) => format!(
                "'{name}' has no coordinates. Pick the city from the search results instead."
            ),
        }
    }
}
