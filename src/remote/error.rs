//! Errors reported by a [`Transport`](super::Transport).
//!
//! # Security Note
//!
//! Messages never include the access token. Response bodies are kept verbatim
//! because the remote service does not echo credentials back.

use thiserror::Error;

/// Error code the remote service uses for a stale revision number.
pub const REVISION_CONFLICT_CODE: &str = "revn-conflict";

/// Failures surfaced by the transport collaborator.
///
/// The session treats these as opaque except for revision conflicts.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote answered with a non-success status and no structured error.
    #[error("request failed with HTTP status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network {
        /// Description of the failure.
        message: String,
    },

    /// The remote processed the request and refused it.
    #[error("remote rejected the request ({code}): {message}")]
    Rejected {
        /// Machine-readable error code, e.g. `revn-conflict` or `object-not-found`.
        code: String,
        /// Human-readable explanation.
        message: String,
    },

    /// The response could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Description of what's wrong.
        message: String,
    },
}

impl TransportError {
    /// Creates a rejection error.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` if the remote refused a batch built on a stale revision.
    #[must_use]
    pub fn is_revision_conflict(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if code == REVISION_CONFLICT_CODE)
    }
}
