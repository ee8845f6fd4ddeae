use thiserror::Error;

/// Failures talking to the tracking service. None of these are retried here.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Not authenticated with the tracking service")]
    NotAuthenticated,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed: {status} - {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}
