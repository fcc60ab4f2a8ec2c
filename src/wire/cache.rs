//! Short-code cache table for wire map keys.
//!
//! The remote service abbreviates frequently repeated map keys to `^`-prefixed
//! codes. The table is immutable once built and is handed to the decoder
//! explicitly.

use indexmap::IndexMap;

use super::CACHE_PREFIX;

/// Documented cache codes and the key names they stand for.
const STANDARD_ENTRIES: [(&str, &str); 8] = [
    ("^0", "id"),
    ("^1", "name"),
    ("^2", "type"),
    ("^3", "width"),
    ("^4", "height"),
    ("^5", "modified-at"),
    ("^6", "point"),
    ("^7", "matrix"),
];

/// Immutable lookup table from cache codes to key names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTable {
    entries: IndexMap<String, String>,
}

impl CacheTable {
    /// Builds the table of documented cache codes.
    ///
    /// The set is empirically curated. Codes outside it resolve to themselves.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ENTRIES)
    }

    /// Builds a table from arbitrary `(code, name)` pairs.
    ///
    /// Codes missing the `^` prefix are stored with it prepended.
    #[must_use]
    pub fn from_entries<I, C, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(code, name)| {
                let code = code.into();
                let code = if code.starts_with(CACHE_PREFIX) {
                    code
                } else {
                    format!("{CACHE_PREFIX}{code}")
                };
                (code, name.into())
            })
            .collect();
        Self { entries }
    }

    /// Returns the key name for `code`, if the code is known.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Resolves `code` to its key name, or returns it unchanged when unknown.
    #[must_use]
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        self.lookup(code).unwrap_or(code)
    }

    /// Iterates over `(code, name)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    /// Number of codes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheTable {
    fn default() -> Self {
        Self::standard()
    }
}
