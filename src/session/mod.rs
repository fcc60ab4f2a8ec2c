//! Optimistic-concurrency change submission.
//!
//! Each submission runs the same short sequence:
//!
//! ```text
//!   fetch handle ──▶ encode ops ──▶ submit batch
//!   (revn, vern)     (in order)     (one call, all-or-nothing)
//! ```
//!
//! The only suspension points are the fetch and the submit. A batch built
//! against a revision the remote has already moved past is rejected as a
//! whole; it is never merged or retried here.

pub mod batch;
pub mod error;
pub mod mutation;

pub use batch::{DocumentHandle, MutationBatch};
pub use error::{MutationError, MutationResult};
pub use mutation::{Acknowledgement, MutationSession};
