//! The remote document service, seen from this crate.
//!
//! [`Transport`] is the seam between the mutation session and whatever
//! actually talks to the service. Authentication, retries and timeouts live
//! behind it. [`RpcTransport`] is the HTTP implementation used by the server
//! binary. Tests substitute their own.

pub mod error;
pub mod http;

pub use error::{TransportError, REVISION_CONFLICT_CODE};
pub use http::RpcTransport;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::session::DocumentHandle;

/// Read and submit calls against the remote document service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads the current revision metadata of a document.
    ///
    /// Implementations must not cache: every call reflects the remote state.
    async fn fetch_document_handle(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentHandle, TransportError>;

    /// Submits an encoded batch exactly as given and returns the raw wire
    /// response.
    async fn submit_mutation_batch(&self, batch: Value) -> Result<Value, TransportError>;
}
