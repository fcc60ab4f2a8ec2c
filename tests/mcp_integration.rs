//! Integration tests for MCP protocol handling.
//!
//! These tests verify the JSON-RPC 2.0 protocol implementation and drive the
//! full server, from initialisation to tool calls, over an in-memory line
//! transport backed by a fake remote document service.

mod common;

use serde_json::{json, Value};
use uuid::Uuid;

use common::{change_types, FakeRemote};
use design_mutation_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use design_mutation_mcp::mcp::{LineTransport, McpServer, ServerState};
use design_mutation_mcp::session::MutationSession;

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

// =============================================================================
// Server Session Tests
// =============================================================================

fn document() -> Uuid {
    Uuid::parse_str("0b6f4a8e-2f1d-4c3a-9e57-7d1c2b3a4f50").unwrap()
}

fn page() -> Uuid {
    Uuid::parse_str("5c2e9d1a-8b7f-4e6d-a3c2-1f0e9d8c7b6a").unwrap()
}

const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test-client"}}}"#;
const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

fn tool_call(id: i64, name: &str, arguments: &Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

/// Feeds `lines` to a fresh server and returns every message it wrote.
async fn run_session(remote: &FakeRemote, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut transport = LineTransport::new(input.as_bytes(), Vec::new());
    let mut server = McpServer::new(MutationSession::new(remote.clone()));

    server.serve(&mut transport).await.unwrap();
    assert_eq!(server.state(), ServerState::ShuttingDown);

    String::from_utf8(transport.into_writer())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn initialised(mut lines: Vec<String>) -> Vec<String> {
    let mut all = vec![INITIALIZE.to_string(), INITIALIZED.to_string()];
    all.append(&mut lines);
    all
}

/// Parses the JSON text inside a tool result.
fn tool_body(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"] == json!(true)
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &initialised(vec![
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#.to_string(),
        ]),
    )
    .await;

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], "design-mutation-mcp");

    let names: Vec<&str> = replies[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["get_document_info", "apply_changes", "add_rectangle", "decode_wire"]
    );

    assert_eq!(replies[2]["id"], 3);
    assert_eq!(replies[2]["result"], json!({}));
}

#[tokio::test]
async fn test_requests_before_initialisation_are_rejected() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#.to_string()],
    )
    .await;

    assert_eq!(replies[0]["error"]["code"], -32600);
}

#[tokio::test]
async fn test_protocol_errors() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &initialised(vec![
            "not json".to_string(),
            r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#.to_string(),
            INITIALIZE.replace(r#""id":1"#, r#""id":6"#),
        ]),
    )
    .await;

    assert_eq!(replies.len(), 4);
    assert_eq!(replies[1]["error"]["code"], -32700);
    assert_eq!(replies[2]["error"]["code"], -32601);
    assert_eq!(replies[2]["id"], 5);
    assert_eq!(replies[3]["error"]["code"], -32600);
}

#[tokio::test]
async fn test_get_document_info() {
    let remote = FakeRemote::at_revision(12);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "get_document_info",
            &json!({"document_id": document()}),
        )]),
    )
    .await;

    let body = tool_body(&replies[1]);
    assert_eq!(body["status"], "success");
    assert_eq!(body["document"]["revn"], 12);
    assert_eq!(body["document"]["name"], "Landing page");
    assert_eq!(body["document"]["id"], document().to_string());
}

#[tokio::test]
async fn test_apply_changes_submits_one_batch() {
    let remote = FakeRemote::at_revision(5);
    let changes = json!([
        {"type": "add-page", "name": "Icons"},
        {"type": "add-color", "name": "Primary", "color": "#007AFF", "opacity": 1},
        {
            "type": "add-object",
            "page_id": page(),
            "shape": {"kind": "text", "x": 0, "y": 0, "content": "Hi"}
        }
    ]);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "apply_changes",
            &json!({"document_id": document(), "changes": changes}),
        )]),
    )
    .await;

    assert!(!is_tool_error(&replies[1]));
    let body = tool_body(&replies[1]);
    assert_eq!(body["revn"], 5);
    assert_eq!(body["change_count"], 3);
    assert_eq!(body["response"]["revn"], 6);

    let state = remote.state();
    assert_eq!(state.applied.len(), 1);
    assert_eq!(
        change_types(&state.applied[0]),
        ["~:add-page", "~:add-color", "~:add-obj"]
    );
}

#[tokio::test]
async fn test_apply_changes_rejects_malformed_change() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "apply_changes",
            &json!({"document_id": document(), "changes": [{"type": "explode"}]}),
        )]),
    )
    .await;

    assert!(is_tool_error(&replies[1]));
    assert!(remote.state().received.is_empty());
}

#[tokio::test]
async fn test_add_rectangle_tool() {
    let remote = FakeRemote::at_revision(1);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "add_rectangle",
            &json!({
                "document_id": document(),
                "page_id": page(),
                "x": 10, "y": 20, "width": 100, "height": 50,
                "fill_color": "#336699"
            }),
        )]),
    )
    .await;

    let body = tool_body(&replies[1]);
    assert_eq!(body["status"], "success");
    let object_id: Uuid = body["object_id"].as_str().unwrap().parse().unwrap();

    let state = remote.state();
    assert!(state.objects.contains(&object_id));
    let obj = &state.applied[0]["~:changes"][0]["~:obj"];
    assert_eq!(obj["~:selrect"]["~:x2"], 110.0);
    assert_eq!(obj["~:fills"][0]["~:fill-color"], "#336699");
    assert_eq!(obj["~:fills"][0]["~:fill-opacity"], 1.0);
}

#[tokio::test]
async fn test_missing_object_is_reported_as_tool_error() {
    let remote = FakeRemote::at_revision(3);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "apply_changes",
            &json!({
                "document_id": document(),
                "changes": [{"type": "delete-object", "id": Uuid::new_v4(), "page_id": page()}]
            }),
        )]),
    )
    .await;

    assert!(is_tool_error(&replies[1]));
    let body = tool_body(&replies[1]);
    assert_eq!(body["status"], "error");
    assert_eq!(body["stale"], false);
    assert!(body["cause"].as_str().unwrap().contains("object-not-found"));
    assert_eq!(remote.state().revn, 3);
}

#[tokio::test]
async fn test_decode_wire_tool() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(
            2,
            "decode_wire",
            &json!({"value": ["^ ", "^2", "~:rect", "^3", 40, "~:id", format!("~u{}", page())]}),
        )]),
    )
    .await;

    let body = tool_body(&replies[1]);
    assert_eq!(
        body["decoded"],
        json!({"type": "rect", "width": 40, "id": page().to_string()})
    );
}

#[tokio::test]
async fn test_unknown_tool() {
    let remote = FakeRemote::at_revision(0);
    let replies = run_session(
        &remote,
        &initialised(vec![tool_call(2, "render_svg", &json!({}))]),
    )
    .await;

    assert!(is_tool_error(&replies[1]));
    let text = replies[1]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Unknown tool: render_svg"));
}
