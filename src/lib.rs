//! design-mutation-mcp: change submission for remotely hosted design documents
//!
//! Builds batches of design changes (shapes, pages, colors, typographies),
//! encodes them in the service's tagged wire format, and submits each batch
//! under optimistic concurrency: the batch carries the revision it was built
//! against and the remote rejects it whole if that revision is stale.
//!
//! # Architecture
//!
//! - **Wire codec**: Tagged JSON with keyword, UUID and cached-key markers
//! - **Change encoding**: Typed change operations to wire change records,
//!   including full geometry for new shapes
//! - **Mutation session**: Fetch revision, encode, submit; no retries
//!
//! # Modules
//!
//! - [`wire`]: Tagged wire format encode/decode
//! - [`changes`]: Change operations and their encoding
//! - [`remote`]: Transport trait and the HTTP RPC client
//! - [`session`]: Optimistic-concurrency submission
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration and startup errors
//! - [`mcp`]: MCP server exposing the session as tools

pub mod changes;
pub mod config;
pub mod error;
pub mod mcp;
pub mod remote;
pub mod session;
pub mod wire;
