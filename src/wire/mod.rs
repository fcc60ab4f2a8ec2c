//! Tagged wire format spoken by the remote document service.
//!
//! The wire form is JSON in which strings carry meaning through prefixes:
//!
//! - `~:name`: a keyword
//! - `~u<uuid>`: a UUID reference
//! - `^<code>`: a cache code standing in for a previously seen map key
//! - `["^ ", k1, v1, k2, v2, ...]`: an encoded map
//!
//! # Example
//!
//! ```
//! use design_mutation_mcp::wire::{decode, CacheTable};
//! use serde_json::json;
//!
//! let table = CacheTable::standard();
//! let native = decode(&json!(["^ ", "^1", "Cover", "~:type", "~:frame"]), &table);
//! assert_eq!(native, json!({"name": "Cover", "type": "frame"}));
//! ```

pub mod cache;
pub mod codec;

pub use cache::CacheTable;
pub use codec::{
    decode, decode_str, encode, encode_deep, is_canonical_uuid, keyword, keyword_value,
    uuid_value, WireDecoder, WireTag,
};

/// First element of an array that encodes a map.
pub const MAP_MARKER: &str = "^ ";

/// Prefix marking a keyword string.
pub const KEYWORD_PREFIX: &str = "~:";

/// Prefix marking a UUID reference string.
pub const UUID_PREFIX: &str = "~u";

/// Prefix marking a cache code.
pub const CACHE_PREFIX: &str = "^";
