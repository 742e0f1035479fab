// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Minimal JSON-RPC 2.0 surface shared by all three transport bindings.
//!
//! Every binding speaks the same five methods: `initialize`,
//! `notifications/*` (accepted and dropped), `ping`, `tools/list`, and
//! `tools/call`. Session bookkeeping stays in the bindings; this module
//! only parses messages and routes methods to a bound dispatcher.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::dispatcher::Dispatcher;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "s2t-accelerator-gateway";

pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    /// Implementation-defined: the supplied session token is unknown.
    pub const SESSION_NOT_FOUND: i64 = -32001;
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn is_initialize(&self) -> bool {
        self.method == "initialize"
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none() || self.method.starts_with("notifications/")
    }
}

/// Parse a raw JSON value into a request, or produce the ready-to-send
/// error response describing why it is not one.
pub fn parse_request(raw: &Value) -> Result<JsonRpcRequest, Value> {
    serde_json::from_value(raw.clone()).map_err(|e| {
        error_response(
            raw.get("id").cloned().unwrap_or(Value::Null),
            error_codes::INVALID_REQUEST,
            format!("Invalid JSON-RPC request: {}", e),
        )
    })
}

pub fn success_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result })
}

pub fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": code, "message": message.into() },
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Route one request to the bound dispatcher.
///
/// Returns `None` for notifications, which receive no response on any
/// binding. Tool-call failures never surface here as JSON-RPC errors
/// (the dispatcher folds them into the result envelope), so the only error
/// responses this function produces are protocol-level (bad method, bad
/// params).
pub async fn dispatch_request(dispatcher: &Dispatcher, request: &JsonRpcRequest) -> Option<Value> {
    if request.is_notification() {
        return None;
    }
    let id = request.id.clone().unwrap_or(Value::Null);

    let response = match request.method.as_str() {
        "initialize" => success_response(id, initialize_result()),
        "ping" => success_response(id, json!({})),
        "tools/list" => success_response(id, json!({ "tools": dispatcher.list_tools() })),
        "tools/call" => match request.params.get("name").and_then(Value::as_str) {
            Some(name) => {
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                let result = dispatcher.invoke(name, &arguments).await;
                let rendered = serde_json::to_value(&result).unwrap_or_else(|_| json!({}));
                success_response(id, rendered)
            }
            None => error_response(
                id,
                error_codes::INVALID_PARAMS,
                "tools/call requires a 'name' parameter",
            ),
        },
        other => error_response(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    };

    Some(response)
}
