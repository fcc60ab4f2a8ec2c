//! Revision metadata and the atomic submission unit.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::wire;

/// Minimal metadata needed to submit a batch against a document.
///
/// Only valid for the submission it was fetched for: the remote advances
/// `revn` with every accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHandle {
    /// Document id.
    pub id: Uuid,
    /// Revision number, advanced by one per accepted batch.
    pub revn: u64,
    /// Version number of the document format.
    pub vern: u64,
    /// Document name.
    pub name: String,
}

impl DocumentHandle {
    /// Extracts the handle fields from a decoded document response.
    ///
    /// Returns `None` when `revn` is missing. `vern` defaults to 0 and `name`
    /// to empty.
    #[must_use]
    pub fn from_decoded(id: Uuid, decoded: &Value) -> Option<Self> {
        let revn = decoded.get("revn").and_then(Value::as_u64)?;
        let vern = decoded.get("vern").and_then(Value::as_u64).unwrap_or(0);
        let name = decoded
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self {
            id,
            revn,
            vern,
            name,
        })
    }
}

/// A set of encoded changes bound to one document revision.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationBatch {
    /// Target document.
    pub document_id: Uuid,
    /// Submitting session, for attribution.
    pub session_id: Uuid,
    /// Revision the changes were built against.
    pub revn: u64,
    /// Version number of the document format.
    pub vern: u64,
    /// Encoded changes, in application order.
    pub changes: Vec<Value>,
}

impl MutationBatch {
    /// Number of changes in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if the batch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The root wire structure sent to the remote.
    ///
    /// Ids are UUID-tagged, keys are keywords, and the already encoded changes
    /// are embedded unchanged.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "id".into(),
            Value::String(self.document_id.hyphenated().to_string()),
        );
        root.insert(
            "session-id".into(),
            Value::String(self.session_id.hyphenated().to_string()),
        );
        root.insert("revn".into(), Value::from(self.revn));
        root.insert("vern".into(), Value::from(self.vern));
        root.insert("changes".into(), Value::Array(self.changes.clone()));
        Value::Object(wire::encode(&root))
    }
}
