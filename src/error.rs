//! Retrieval errors.
//!
//! Empty results are not errors (they come back as empty vectors), and a title
//! missing from a correction lookup falls back to the original text. Anything
//! that lands here propagates to the caller unchanged.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure talking to a remote collaborator.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The collaborator answered with a non-success status.
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    /// The collaborator reported an error in an otherwise successful response.
    #[error("{endpoint} reported error {code}: {info}")]
    Api { endpoint: String, code: String, info: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// A local store (history, recent searches) failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    /// A spawned lookup task panicked or was cancelled.
    #[error("lookup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SourceError {
    /// Every remote failure kind means the remote source is unavailable.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. } | Self::Api { .. } | Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_remote_failures() {
        let e = SourceError::Status { endpoint: "random".into(), status: 503 };
        assert!(e.is_source_unavailable());
        assert_eq!(e.to_string(), "random returned status 503");
        let e = SourceError::Decode { endpoint: "feed".into(), reason: "eof".into() };
        assert!(e.is_source_unavailable());
        let e = SourceError::from(anyhow::anyhow!("disk full"));
        assert!(!e.is_source_unavailable());
        assert_eq!(e.to_string(), "disk full");
    }
}
