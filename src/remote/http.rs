//! HTTP RPC transport.
//!
//! Every command is a `POST <base_url>/api/rpc/command/<name>` whose body and
//! response are in the tagged wire format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Transport, TransportError};
use crate::config::RemoteConfig;
use crate::session::DocumentHandle;
use crate::wire::{self, CacheTable, WireDecoder};

/// Media type of wire-format bodies.
pub const TRANSIT_JSON: &str = "application/transit+json";

const GET_FILE: &str = "get-file";
const UPDATE_FILE: &str = "update-file";

/// Transport that calls the remote RPC endpoint over HTTP.
#[derive(Clone)]
pub struct RpcTransport {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    table: CacheTable,
}

impl RpcTransport {
    /// Creates a transport for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
        table: CacheTable,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            table,
        })
    }

    /// Creates a transport from the `remote` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, TransportError> {
        Self::new(
            config.base_url.clone(),
            config.resolved_access_token(),
            Duration::from_secs(config.timeout_secs),
            CacheTable::standard(),
        )
    }

    /// URL of an RPC command.
    #[must_use]
    pub fn command_url(&self, command: &str) -> String {
        format!("{}/api/rpc/command/{command}", self.base_url)
    }

    /// Sends one command and returns its raw wire response.
    async fn call(&self, command: &str, body: &Value) -> Result<Value, TransportError> {
        let url = self.command_url(command);
        tracing::debug!(%url, "sending RPC command");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, TRANSIT_JSON)
            .header(ACCEPT, TRANSIT_JSON)
            .body(body.to_string());
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Token {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), command, "RPC command failed");
            return Err(self.error_from_body(status.as_u16(), text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            TransportError::invalid_response(format!("{command} returned malformed JSON: {e}"))
        })
    }

    /// Classifies a failed response body.
    ///
    /// Bodies carrying a `code` become [`TransportError::Rejected`]; anything
    /// else is reported as a plain HTTP failure.
    #[must_use]
    pub fn error_from_body(&self, status: u16, body: String) -> TransportError {
        let decoded = serde_json::from_str::<Value>(&body)
            .map(|wire| WireDecoder::new(&self.table).decode(&wire))
            .ok();

        let code = decoded
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(Value::as_str);

        match code {
            Some(code) => {
                let message = decoded
                    .as_ref()
                    .and_then(|v| v.get("hint").or_else(|| v.get("message")))
                    .and_then(Value::as_str)
                    .unwrap_or("no details provided");
                TransportError::rejected(code, message)
            }
            None => TransportError::Http { status, body },
        }
    }
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for RpcTransport {
    async fn fetch_document_handle(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentHandle, TransportError> {
        let mut params = Map::new();
        params.insert(
            "id".into(),
            Value::String(document_id.hyphenated().to_string()),
        );
        let body = Value::Object(wire::encode(&params));

        let response = self.call(GET_FILE, &body).await?;
        let decoded = WireDecoder::new(&self.table).decode(&response);

        DocumentHandle::from_decoded(document_id, &decoded).ok_or_else(|| {
            TransportError::invalid_response(format!(
                "{GET_FILE} response for {document_id} has no revision number"
            ))
        })
    }

    async fn submit_mutation_batch(&self, batch: Value) -> Result<Value, TransportError> {
        self.call(UPDATE_FILE, &batch).await
    }
}
