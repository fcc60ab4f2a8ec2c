//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes document mutation to AI assistants as MCP tools. The server speaks
//! JSON-RPC 2.0 over newline-delimited stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌────────────────┐   │
//! │   │  Transport  │───▶│   Server    │───▶│    Mutation    │   │
//! │   │   (lines)   │    │ (lifecycle) │    │    Session     │   │
//! │   └─────────────┘    └─────────────┘    └────────────────┘   │
//! │                                                 │            │
//! │                                                 ▼            │
//! │                                      ┌────────────────────┐  │
//! │                                      │  Remote transport  │  │
//! │                                      └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ServerState, ToolCallResult};
pub use transport::{LineTransport, StdioTransport};
