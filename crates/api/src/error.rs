use reqwest::StatusCode;
use thiserror::Error;

use crate::response::JsonParseError;

/// Errors surfaced by [`LogApiClient`](crate::LogApiClient) operations.
///
/// Field statistics never produce [`ApiError::Transport`]; a non-2xx
/// response there resolves to an empty result instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status. Displays the status
    /// text only; request context is left to the caller.
    #[error("{status_text}")]
    Transport { status: StatusCode, status_text: String },
    /// The request could not be sent or its body could not be read.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    /// The response body was not the expected JSON.
    #[error(transparent)]
    Decode(#[from] JsonParseError),
    /// A request URL could not be built under the configured base.
    #[error("invalid request URL '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl ApiError {
    pub fn transport(status: StatusCode) -> Self {
        Self::Transport {
            status,
            status_text: crate::response::status_text(status),
        }
    }

    /// HTTP status carried by a transport error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Network(error) => error.status(),
            _ => None,
        }
    }
}
