//! In-memory stand-in for the remote document service.
//!
//! Keeps a revision counter and a set of live object ids, and behaves like
//! the real service for the parts the session cares about: batches against
//! a stale revision are rejected whole, accepted batches advance the
//! revision by one, and deleting an unknown object is refused.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use design_mutation_mcp::remote::{Transport, TransportError, REVISION_CONFLICT_CODE};
use design_mutation_mcp::session::DocumentHandle;

/// Observable state of the fake remote.
#[derive(Debug, Default)]
pub struct RemoteState {
    pub revn: u64,
    pub vern: u64,
    pub name: String,
    /// Ids of objects that currently exist.
    pub objects: HashSet<Uuid>,
    /// Number of handle fetches served.
    pub fetches: usize,
    /// Every batch received, accepted or not.
    pub received: Vec<Value>,
    /// Batches that were applied, in order.
    pub applied: Vec<Value>,
    /// Fails every fetch with a network error when set.
    pub offline: bool,
}

/// Cloneable handle to a shared [`RemoteState`].
#[derive(Debug, Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn at_revision(revn: u64) -> Self {
        let remote = Self::default();
        {
            let mut state = remote.state();
            state.revn = revn;
            state.vern = 3;
            state.name = "Landing page".to_string();
        }
        remote
    }

    pub fn state(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap()
    }

    /// Simulates another client landing a batch.
    pub fn concurrent_write(&self) {
        self.state().revn += 1;
    }

    pub fn with_object(self, id: Uuid) -> Self {
        self.state().objects.insert(id);
        self
    }
}

fn tagged_uuid(value: &Value) -> Option<Uuid> {
    value
        .as_str()
        .and_then(|s| s.strip_prefix("~u"))
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Change type keywords of a wire batch, in order.
pub fn change_types(batch: &Value) -> Vec<String> {
    batch["~:changes"]
        .as_array()
        .map(|changes| {
            changes
                .iter()
                .filter_map(|c| c["~:type"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Transport for FakeRemote {
    async fn fetch_document_handle(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentHandle, TransportError> {
        let mut state = self.state();
        if state.offline {
            return Err(TransportError::network("connection refused"));
        }
        state.fetches += 1;
        Ok(DocumentHandle {
            id: document_id,
            revn: state.revn,
            vern: state.vern,
            name: state.name.clone(),
        })
    }

    async fn submit_mutation_batch(&self, batch: Value) -> Result<Value, TransportError> {
        let mut state = self.state();
        state.received.push(batch.clone());

        let revn = batch["~:revn"]
            .as_u64()
            .ok_or_else(|| TransportError::invalid_response("batch without revn"))?;
        if revn != state.revn {
            return Err(TransportError::rejected(
                REVISION_CONFLICT_CODE,
                format!("expected revision {}, got {revn}", state.revn),
            ));
        }

        let changes = batch["~:changes"].as_array().cloned().unwrap_or_default();
        let mut objects = state.objects.clone();
        for change in &changes {
            let id = tagged_uuid(&change["~:id"]);
            match (change["~:type"].as_str(), id) {
                (Some("~:add-obj"), Some(id)) => {
                    objects.insert(id);
                }
                (Some("~:del-obj"), Some(id)) => {
                    if !objects.remove(&id) {
                        return Err(TransportError::rejected(
                            "object-not-found",
                            format!("object {id} does not exist"),
                        ));
                    }
                }
                _ => {}
            }
        }

        state.objects = objects;
        state.revn += 1;
        state.applied.push(batch);
        Ok(json!(["^ ", "~:revn", state.revn, "~:lagged", []]))
    }
}
