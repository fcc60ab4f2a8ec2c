//! Decoder and encoder for the tagged wire form.
//!
//! Decoding is total: every wire shape maps to a native value, and tags the
//! decoder does not understand are passed through unchanged. Encoding only
//! reintroduces keyword and UUID tags; cache codes are never produced.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::cache::CacheTable;
use super::{CACHE_PREFIX, KEYWORD_PREFIX, MAP_MARKER, UUID_PREFIX};

/// Canonical 8-4-4-4-12 hex UUID text.
const UUID_REGEX: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(UUID_REGEX).expect("UUID pattern is a valid regex"))
}

/// The tag carried by a wire string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireTag<'a> {
    /// The `"^ "` marker opening an encoded map.
    MapMarker,
    /// A keyword; holds the name without prefix.
    Keyword(&'a str),
    /// A UUID reference; holds the text without prefix.
    Uuid(&'a str),
    /// A cache code; holds the full code including `^`.
    Cached(&'a str),
    /// An untagged string.
    Plain(&'a str),
}

impl<'a> WireTag<'a> {
    /// Classifies a wire string by its prefix.
    #[must_use]
    pub fn classify(s: &'a str) -> Self {
        if s == MAP_MARKER {
            Self::MapMarker
        } else if let Some(name) = s.strip_prefix(KEYWORD_PREFIX) {
            Self::Keyword(name)
        } else if let Some(id) = s.strip_prefix(UUID_PREFIX) {
            Self::Uuid(id)
        } else if s.len() > CACHE_PREFIX.len() && s.starts_with(CACHE_PREFIX) {
            Self::Cached(s)
        } else {
            Self::Plain(s)
        }
    }
}

/// Recursive decoder from wire form to native values.
#[derive(Debug, Clone, Copy)]
pub struct WireDecoder<'t> {
    table: &'t CacheTable,
}

impl<'t> WireDecoder<'t> {
    /// Creates a decoder that resolves cache codes through `table`.
    #[must_use]
    pub const fn new(table: &'t CacheTable) -> Self {
        Self { table }
    }

    /// Decodes any wire value. Never fails.
    #[must_use]
    pub fn decode(&self, wire: &Value) -> Value {
        match wire {
            Value::Array(items) => match items.split_first() {
                Some((Value::String(first), rest)) if first == MAP_MARKER => {
                    Value::Object(self.decode_marker_map(rest))
                }
                _ => Value::Array(items.iter().map(|item| self.decode(item)).collect()),
            },
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| {
                        let key = key.strip_prefix(UUID_PREFIX).unwrap_or(key);
                        (key.to_string(), self.decode(value))
                    })
                    .collect(),
            ),
            Value::String(s) => Value::String(decode_str(s).to_string()),
            other => other.clone(),
        }
    }

    /// Reads alternating key/value pairs that followed a map marker.
    fn decode_marker_map(&self, pairs: &[Value]) -> Map<String, Value> {
        pairs
            .chunks(2)
            .map(|pair| {
                let key = match &pair[0] {
                    Value::String(s) => self.decode_key(s),
                    other => other.to_string(),
                };
                let value = pair.get(1).map_or(Value::Null, |v| self.decode(v));
                (key, value)
            })
            .collect()
    }

    fn decode_key(&self, key: &str) -> String {
        match WireTag::classify(key) {
            WireTag::Cached(code) => self.table.lookup(code).map_or_else(
                || {
                    tracing::trace!(code, "unresolved cache code passed through");
                    code.to_string()
                },
                str::to_string,
            ),
            WireTag::Keyword(name) => name.to_string(),
            WireTag::MapMarker | WireTag::Uuid(_) | WireTag::Plain(_) => key.to_string(),
        }
    }
}

/// Strips a keyword or UUID prefix from a scalar string.
#[must_use]
pub fn decode_str(s: &str) -> &str {
    match WireTag::classify(s) {
        WireTag::Keyword(rest) | WireTag::Uuid(rest) => rest,
        WireTag::MapMarker | WireTag::Cached(_) | WireTag::Plain(_) => s,
    }
}

/// Decodes `wire` with the given cache table.
#[must_use]
pub fn decode(wire: &Value, table: &CacheTable) -> Value {
    WireDecoder::new(table).decode(wire)
}

/// Returns `true` if `s` is a canonical hyphenated UUID.
#[must_use]
pub fn is_canonical_uuid(s: &str) -> bool {
    uuid_pattern().is_match(s)
}

/// Returns `name` as a keyword, adding the prefix only if missing.
#[must_use]
pub fn keyword(name: &str) -> String {
    if name.starts_with(KEYWORD_PREFIX) {
        name.to_string()
    } else {
        format!("{KEYWORD_PREFIX}{name}")
    }
}

/// Returns a keyword wire value.
#[must_use]
pub fn keyword_value(name: &str) -> Value {
    Value::String(keyword(name))
}

/// Returns a UUID reference wire value.
#[must_use]
pub fn uuid_value(id: &Uuid) -> Value {
    Value::String(format!("{UUID_PREFIX}{}", id.hyphenated()))
}

/// Encodes a scalar, tagging it if it is UUID-shaped.
fn encode_scalar(value: &Value) -> Value {
    match value {
        Value::String(s) if is_canonical_uuid(s) => Value::String(format!("{UUID_PREFIX}{s}")),
        other => other.clone(),
    }
}

/// Shallow encode: keys become keywords, UUID-shaped string values are tagged.
///
/// Nested arrays and objects are copied as-is.
#[must_use]
pub fn encode(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (keyword(key), encode_scalar(value)))
        .collect()
}

/// Deep encode to arbitrary depth.
#[must_use]
pub fn encode_deep(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (keyword(key), encode_deep(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(encode_deep).collect()),
        scalar => encode_scalar(scalar),
    }
}
