//! Fetch, encode and submit in one call.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::batch::{DocumentHandle, MutationBatch};
use super::error::{MutationError, MutationResult};
use crate::changes::{ChangeEncoder, ChangeOp};
use crate::remote::Transport;
use crate::wire::{CacheTable, WireDecoder};

/// What the remote returned for an accepted batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    /// Target document.
    pub document_id: Uuid,
    /// Revision the batch was applied on top of.
    pub revn: u64,
    /// Number of changes submitted.
    pub change_count: usize,
    /// Decoded response body.
    pub response: Value,
}

/// Submits change batches on behalf of one process.
///
/// The session id is generated once and attached to every batch for remote
/// attribution. No document state is cached: each [`submit`](Self::submit)
/// reads the revision fresh.
pub struct MutationSession<T> {
    transport: T,
    session_id: Uuid,
    encoder: ChangeEncoder,
    table: CacheTable,
}

impl<T: Transport> MutationSession<T> {
    /// Creates a session with a fresh session id and the standard cache table.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_table(transport, CacheTable::standard())
    }

    /// Creates a session that decodes responses through `table`.
    #[must_use]
    pub fn with_table(transport: T, table: CacheTable) -> Self {
        Self {
            transport,
            session_id: Uuid::new_v4(),
            encoder: ChangeEncoder::new(),
            table,
        }
    }

    /// Replaces the change encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: ChangeEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// This session's attribution id.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The cache table used for decoding responses.
    #[must_use]
    pub const fn cache_table(&self) -> &CacheTable {
        &self.table
    }

    /// Reads the current handle of a document.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Fetch`] if the transport fails.
    pub async fn fetch_handle(&self, document_id: Uuid) -> MutationResult<DocumentHandle> {
        self.transport
            .fetch_document_handle(document_id)
            .await
            .map_err(|source| MutationError::Fetch {
                document_id,
                source,
            })
    }

    /// Encodes `ops` into a batch bound to `handle`'s revision.
    #[must_use]
    pub fn build_batch(&self, handle: &DocumentHandle, ops: &[ChangeOp]) -> MutationBatch {
        MutationBatch {
            document_id: handle.id,
            session_id: self.session_id,
            revn: handle.revn,
            vern: handle.vern,
            changes: self.encoder.encode_all(ops),
        }
    }

    /// Submits an already built batch.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::StaleRevision`] if the remote reports a
    /// revision conflict, or [`MutationError::Submit`] for any other failure.
    pub async fn submit_batch(&self, batch: &MutationBatch) -> MutationResult<Acknowledgement> {
        tracing::debug!(
            document_id = %batch.document_id,
            session_id = %self.session_id,
            revn = batch.revn,
            changes = batch.len(),
            "submitting mutation batch"
        );

        match self.transport.submit_mutation_batch(batch.to_wire()).await {
            Ok(response) => {
                tracing::info!(
                    document_id = %batch.document_id,
                    revn = batch.revn,
                    changes = batch.len(),
                    "mutation batch accepted"
                );
                Ok(Acknowledgement {
                    document_id: batch.document_id,
                    revn: batch.revn,
                    change_count: batch.len(),
                    response: WireDecoder::new(&self.table).decode(&response),
                })
            }
            Err(source) if source.is_revision_conflict() => {
                tracing::warn!(
                    document_id = %batch.document_id,
                    revn = batch.revn,
                    "mutation batch rejected as stale"
                );
                Err(MutationError::StaleRevision {
                    document_id: batch.document_id,
                    revn: batch.revn,
                    source,
                })
            }
            Err(source) => {
                tracing::warn!(
                    document_id = %batch.document_id,
                    error = %source,
                    "mutation batch failed"
                );
                Err(MutationError::Submit {
                    document_id: batch.document_id,
                    source,
                })
            }
        }
    }

    /// Fetches the current revision, encodes `ops` and submits them as one
    /// batch.
    ///
    /// Ops are applied remotely in the given order. Nothing is retried: on
    /// [`MutationError::StaleRevision`] the caller decides whether to call
    /// again.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch or the submit fails.
    pub async fn submit(
        &self,
        document_id: Uuid,
        ops: &[ChangeOp],
    ) -> MutationResult<Acknowledgement> {
        let handle = self.fetch_handle(document_id).await?;
        let batch = self.build_batch(&handle, ops);
        self.submit_batch(&batch).await
    }
}

impl<T> std::fmt::Debug for MutationSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationSession")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
