//! Errors from a mutation submission.

use thiserror::Error;
use uuid::Uuid;

use crate::remote::TransportError;

/// Result type for mutation sessions.
pub type MutationResult<T> = Result<T, MutationError>;

/// Why a submission failed.
///
/// Every variant means nothing was applied as far as the caller can tell:
/// the batch is all-or-nothing and no local state needs rolling back.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The current revision could not be read.
    #[error("failed to fetch document {document_id}")]
    Fetch {
        /// Target document.
        document_id: Uuid,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The batch was built against a revision the remote has moved past.
    ///
    /// Recover by fetching a fresh handle and resubmitting.
    #[error("revision {revn} of document {document_id} is stale")]
    StaleRevision {
        /// Target document.
        document_id: Uuid,
        /// Revision the batch was built against.
        revn: u64,
        /// The remote's rejection.
        #[source]
        source: TransportError,
    },

    /// The batch was rejected or the submit call failed.
    #[error("failed to submit changes to document {document_id}")]
    Submit {
        /// Target document.
        document_id: Uuid,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl MutationError {
    /// The transport error behind this failure.
    #[must_use]
    pub const fn transport_error(&self) -> &TransportError {
        match self {
            Self::Fetch { source, .. }
            | Self::StaleRevision { source, .. }
            | Self::Submit { source, .. } => source,
        }
    }

    /// Returns `true` if refetching and resubmitting may succeed.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleRevision { .. })
    }
}
