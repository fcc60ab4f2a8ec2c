//! MCP server exposing the mutation session as tools.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Graceful termination on EOF or signal
//!
//! # Tools
//!
//! | Tool                | Remote calls             |
//! |---------------------|--------------------------|
//! | `get_document_info` | fetch                    |
//! | `apply_changes`     | fetch, then one submit   |
//! | `add_rectangle`     | fetch, then one submit   |
//! | `decode_wire`       | none                     |
//!
//! Tool failures are reported as `isError` results. Protocol failures are
//! JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use uuid::Uuid;

use crate::changes::{BoxShape, ChangeOp, NewObject, ShapeSpec};
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{LineTransport, StdioTransport};
use crate::remote::Transport;
use crate::session::{MutationError, MutationSession};
use crate::wire;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // skip_serializing_if needs fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Successful result carrying pretty-printed JSON.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::text(pretty(value))
    }

    /// Error result carrying pretty-printed JSON.
    #[must_use]
    pub fn json_error(value: &Value) -> Self {
        Self::error(pretty(value))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// The MCP server.
pub struct McpServer<T> {
    /// Current server state.
    state: ServerState,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Session every mutating tool submits through.
    session: MutationSession<T>,
}

impl<T: Transport> McpServer<T> {
    /// Creates a server that submits through `session`.
    #[must_use]
    pub const fn new(session: MutationSession<T>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            protocol_version: None,
            session,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// The negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the server on stdio until EOF or a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.run_with_shutdown(&mut transport).await
    }

    /// Serves messages from `transport` until EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve<R, W>(&mut self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let line_result = transport.read_line().await;
            if self.handle_transport_result(line_result, transport).await? {
                return Ok(());
            }
        }
    }

    #[cfg(unix)]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = transport.read_line() => {
                    if self.handle_transport_result(line_result, transport).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    #[cfg(windows)]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = transport.read_line() => {
                    if self.handle_transport_result(line_result, transport).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles one read from the transport.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result<R, W>(
        &mut self,
        line_result: std::io::Result<Option<String>>,
        transport: &mut LineTransport<R, W>,
    ) -> std::io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(line) = line_result? else {
            tracing::debug!("Input closed, shutting down");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        match self.handle_line(&line).await {
            Some(Ok(response)) => transport.write_message(&response).await?,
            Some(Err(error)) => transport.write_message(&error).await?,
            None => {}
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    ///
    /// Returns the message to send back, or `None` for blank lines and
    /// notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<Result<JsonRpcResponse, JsonRpcError>> {
        if line.trim().is_empty() {
            return None;
        }

        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => Some(self.handle_request(req).await),
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                None
            }
            Err(error) => Some(Err(error)),
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");
        match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        tracing::info!(
            requested = %params.protocol_version,
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            "Initialising"
        );

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": Self::get_tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    async fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let result = match params.name.as_str() {
            "get_document_info" => self.call_get_document_info(&params.arguments).await,
            "apply_changes" => self.call_apply_changes(&params.arguments).await,
            "add_rectangle" => self.call_add_rectangle(&params.arguments).await,
            "decode_wire" => self.call_decode_wire(&params.arguments),
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            ));
        }
        Ok(())
    }

    /// Returns the list of available tools.
    #[allow(clippy::too_many_lines)]
    fn get_tool_definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "get_document_info".to_string(),
                description: Some(
                    "Fetch the current revision metadata of a remote design document \
                     (id, revn, vern, name). The revision is read fresh on every call."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "document_id": {
                            "type": "string",
                            "description": "Document UUID"
                        }
                    },
                    "required": ["document_id"]
                }),
            },
            ToolDefinition {
                name: "apply_changes".to_string(),
                description: Some(
                    "Apply an ordered list of changes to a document as one atomic batch. \
                     The current revision is fetched first and the batch is bound to it. \
                     If another writer got there first the whole batch is rejected as stale \
                     and nothing is applied; call again to retry against the new revision. \
                     Each change is an object with a \"type\" of add-object, modify-object, \
                     delete-object, add-page, modify-page, delete-page, add-color, \
                     modify-color, delete-color, add-typography, modify-typography or \
                     delete-typography."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "document_id": {
                            "type": "string",
                            "description": "Document UUID"
                        },
                        "changes": {
                            "type": "array",
                            "description": "Changes in application order",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "type": {
                                        "type": "string",
                                        "enum": [
                                            "add-object", "modify-object", "delete-object",
                                            "add-page", "modify-page", "delete-page",
                                            "add-color", "modify-color", "delete-color",
                                            "add-typography", "modify-typography",
                                            "delete-typography"
                                        ]
                                    }
                                },
                                "required": ["type"]
                            },
                            "minItems": 1
                        }
                    },
                    "required": ["document_id", "changes"]
                }),
            },
            ToolDefinition {
                name: "add_rectangle".to_string(),
                description: Some(
                    "Add a single rectangle to a page. Coordinates are in canvas units with \
                     the origin at the top-left of the page."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "document_id": { "type": "string", "description": "Document UUID" },
                        "page_id": { "type": "string", "description": "Page UUID" },
                        "x": { "type": "number", "description": "Left edge" },
                        "y": { "type": "number", "description": "Top edge" },
                        "width": { "type": "number", "description": "Width" },
                        "height": { "type": "number", "description": "Height" },
                        "name": { "type": "string", "description": "Optional display name" },
                        "fill_color": {
                            "type": "string",
                            "description": "Optional fill color as #RRGGBB"
                        },
                        "fill_opacity": {
                            "type": "number",
                            "description": "Optional fill opacity between 0 and 1 (default: 1)"
                        }
                    },
                    "required": ["document_id", "page_id", "x", "y", "width", "height"]
                }),
            },
            ToolDefinition {
                name: "decode_wire".to_string(),
                description: Some(
                    "Decode a value in the tagged wire format into plain JSON: strips \
                     keyword and UUID tags and resolves cached keys."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "value": {
                            "description": "Any JSON value in wire form"
                        }
                    },
                    "required": ["value"]
                }),
            },
        ]
    }

    async fn call_get_document_info(&self, arguments: &Value) -> ToolCallResult {
        let document_id = match uuid_argument(arguments, "document_id") {
            Ok(id) => id,
            Err(result) => return result,
        };

        match self.session.fetch_handle(document_id).await {
            Ok(handle) => ToolCallResult::json(&json!({
                "status": "success",
                "document": handle,
            })),
            Err(e) => mutation_failure(&e),
        }
    }

    async fn call_apply_changes(&self, arguments: &Value) -> ToolCallResult {
        let document_id = match uuid_argument(arguments, "document_id") {
            Ok(id) => id,
            Err(result) => return result,
        };

        let Some(changes) = arguments.get("changes") else {
            return ToolCallResult::error("Missing required parameter: changes");
        };

        let ops: Vec<ChangeOp> = match serde_json::from_value(changes.clone()) {
            Ok(ops) => ops,
            Err(e) => return ToolCallResult::error(format!("Invalid changes: {e}")),
        };

        if ops.is_empty() {
            return ToolCallResult::error("changes must contain at least one change");
        }

        match self.submit(document_id, &ops).await {
            Ok(result) => ToolCallResult::json(&result),
            Err(failure) => failure,
        }
    }

    async fn call_add_rectangle(&self, arguments: &Value) -> ToolCallResult {
        let document_id = match uuid_argument(arguments, "document_id") {
            Ok(id) => id,
            Err(result) => return result,
        };
        let page_id = match uuid_argument(arguments, "page_id") {
            Ok(id) => id,
            Err(result) => return result,
        };

        let mut dims = [0.0; 4];
        for (slot, key) in dims.iter_mut().zip(["x", "y", "width", "height"]) {
            let Some(v) = arguments.get(key).and_then(Value::as_f64) else {
                return ToolCallResult::error(format!("Missing required parameter: {key}"));
            };
            *slot = v;
        }
        let [x, y, width, height] = dims;

        let mut rect = BoxShape::new(x, y, width, height);
        if let Some(name) = arguments.get("name").and_then(Value::as_str) {
            rect = rect.named(name);
        }
        if let Some(color) = arguments.get("fill_color").and_then(Value::as_str) {
            let opacity = arguments.get("fill_opacity").and_then(Value::as_f64);
            rect = rect.with_fill(color, opacity);
        }

        let object_id = Uuid::new_v4();
        let op = ChangeOp::AddObject(
            NewObject::new(page_id, ShapeSpec::Rect(rect)).with_id(object_id),
        );

        match self.submit(document_id, std::slice::from_ref(&op)).await {
            Ok(mut result) => {
                result["object_id"] = json!(object_id);
                ToolCallResult::json(&result)
            }
            Err(failure) => failure,
        }
    }

    fn call_decode_wire(&self, arguments: &Value) -> ToolCallResult {
        let Some(value) = arguments.get("value") else {
            return ToolCallResult::error("Missing required parameter: value");
        };

        ToolCallResult::json(&json!({
            "status": "success",
            "decoded": wire::decode(value, self.session.cache_table()),
        }))
    }

    async fn submit(&self, document_id: Uuid, ops: &[ChangeOp]) -> Result<Value, ToolCallResult> {
        match self.session.submit(document_id, ops).await {
            Ok(ack) => Ok(json!({
                "status": "success",
                "document_id": ack.document_id,
                "revn": ack.revn,
                "change_count": ack.change_count,
                "changes": ops.iter().map(ChangeOp::label).collect::<Vec<_>>(),
                "response": ack.response,
            })),
            Err(e) => Err(mutation_failure(&e)),
        }
    }
}

impl<T> std::fmt::Debug for McpServer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("state", &self.state)
            .field("protocol_version", &self.protocol_version)
            .finish_non_exhaustive()
    }
}

fn uuid_argument(arguments: &Value, key: &str) -> Result<Uuid, ToolCallResult> {
    let Some(raw) = arguments.get(key).and_then(Value::as_str) else {
        return Err(ToolCallResult::error(format!(
            "Missing required parameter: {key}"
        )));
    };
    Uuid::parse_str(raw)
        .map_err(|e| ToolCallResult::error(format!("Invalid UUID for {key} '{raw}': {e}")))
}

fn mutation_failure(error: &MutationError) -> ToolCallResult {
    let mut result = json!({
        "status": "error",
        "error": error.to_string(),
        "cause": error.transport_error().to_string(),
        "stale": error.is_stale(),
    });
    if error.is_stale() {
        result["hint"] = json!("The document changed remotely; call again to retry.");
    }
    ToolCallResult::json_error(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::TransportError;
    use crate::session::DocumentHandle;
    use async_trait::async_trait;

    struct OfflineTransport;

    #[async_trait]
    impl Transport for OfflineTransport {
        async fn fetch_document_handle(
            &self,
            _document_id: Uuid,
        ) -> Result<DocumentHandle, TransportError> {
            Err(TransportError::network("offline"))
        }

        async fn submit_mutation_batch(&self, _batch: Value) -> Result<Value, TransportError> {
            Err(TransportError::network("offline"))
        }
    }

    fn server() -> McpServer<OfflineTransport> {
        McpServer::new(MutationSession::new(OfflineTransport))
    }

    fn text_of(result: &ToolCallResult) -> &str {
        match &result.content[0] {
            ToolContent::Text { text } => text,
        }
    }

    #[test]
    fn server_initial_state() {
        let server = server();
        assert_eq!(server.state(), ServerState::AwaitingInit);
        assert!(server.protocol_version().is_none());
    }

    #[test]
    fn tool_definitions_valid() {
        let tools = McpServer::<OfflineTransport>::get_tool_definitions();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            ["get_document_info", "apply_changes", "add_rectangle", "decode_wire"]
        );
        for tool in &tools {
            assert!(tool.input_schema.is_object());
        }
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        assert!(!result.is_error);
        assert_eq!(text_of(&result), "Hello, world!");
    }

    #[test]
    fn tool_call_result_error() {
        let result = ToolCallResult::error("Something went wrong");
        assert!(result.is_error);
        assert_eq!(text_of(&result), "Something went wrong");
    }

    #[test]
    fn decode_wire_uses_session_table() {
        let result = server().call_decode_wire(&json!({
            "value": ["^ ", "^1", "Board", "~:id", "~u6f1c1a52-7a77-4c8e-9d7e-3b5f3f1d2a10"]
        }));
        assert!(!result.is_error);
        let body: Value = serde_json::from_str(text_of(&result)).unwrap();
        assert_eq!(body["decoded"]["name"], "Board");
        assert_eq!(body["decoded"]["id"], "6f1c1a52-7a77-4c8e-9d7e-3b5f3f1d2a10");
    }

    #[test]
    fn decode_wire_requires_value() {
        let result = server().call_decode_wire(&json!({}));
        assert!(result.is_error);
        assert!(text_of(&result).contains("value"));
    }

    #[tokio::test]
    async fn apply_changes_rejects_empty_list() {
        let result = server()
            .call_apply_changes(&json!({
                "document_id": Uuid::new_v4().to_string(),
                "changes": []
            }))
            .await;
        assert!(result.is_error);
        assert!(text_of(&result).contains("at least one"));
    }

    #[tokio::test]
    async fn apply_changes_rejects_bad_uuid() {
        let result = server()
            .call_apply_changes(&json!({"document_id": "nope", "changes": []}))
            .await;
        assert!(result.is_error);
        assert!(text_of(&result).contains("Invalid UUID"));
    }

    #[tokio::test]
    async fn fetch_failure_is_a_tool_error() {
        let result = server()
            .call_get_document_info(&json!({"document_id": Uuid::new_v4().to_string()}))
            .await;
        assert!(result.is_error);
        let body: Value = serde_json::from_str(text_of(&result)).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["stale"], false);
        assert!(body["cause"].as_str().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn add_rectangle_requires_dimensions() {
        let result = server()
            .call_add_rectangle(&json!({
                "document_id": Uuid::new_v4().to_string(),
                "page_id": Uuid::new_v4().to_string(),
                "x": 0, "y": 0, "width": 10
            }))
            .await;
        assert!(result.is_error);
        assert!(text_of(&result).contains("height"));
    }

    #[tokio::test]
    async fn tools_require_initialisation() {
        let mut server = server();
        let reply = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert!(reply.is_err());
    }

    #[tokio::test]
    async fn blank_lines_and_notifications_get_no_reply() {
        let mut server = server();
        assert!(server.handle_line("   ").await.is_none());
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }
}
