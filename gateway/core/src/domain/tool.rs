// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tool catalog value objects.
//!
//! A [`ToolDescriptor`] is the immutable, startup-time description of one
//! accelerator operation: its name, human-readable documentation, declared
//! input shape, and side-effect annotations. [`CallResult`] is the single
//! result envelope crossing the dispatcher boundary: every tool call,
//! successful or not, is rendered into this shape before the transport
//! layer sees it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::schema::InputSchema;

/// Side-effect annotations surfaced to MCP clients alongside each tool.
///
/// Advisory only: callers use these to decide confirmation policy. The
/// dispatcher does not enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolAnnotations {
    pub read_only: bool,
    pub destructive: bool,
    pub idempotent: bool,
    pub open_world: bool,
}

impl ToolAnnotations {
    /// A read-only remote query (list/get/check operations).
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            destructive: false,
            idempotent: true,
            open_world: true,
        }
    }

    /// A mutating remote call that is safe to repeat.
    pub fn idempotent() -> Self {
        Self {
            read_only: false,
            destructive: false,
            idempotent: true,
            open_world: true,
        }
    }

    /// A mutating remote call that is not safe to repeat blindly.
    pub fn mutating() -> Self {
        Self {
            read_only: false,
            destructive: false,
            idempotent: false,
            open_world: true,
        }
    }

    /// A remote call that removes or invalidates state.
    pub fn destructive() -> Self {
        Self {
            read_only: false,
            destructive: true,
            idempotent: true,
            open_world: true,
        }
    }

    /// A purely local operation touching no external system.
    pub fn local() -> Self {
        Self {
            read_only: false,
            destructive: false,
            idempotent: false,
            open_world: false,
        }
    }

    fn to_json(self) -> Value {
        json!({
            "readOnlyHint": self.read_only,
            "destructiveHint": self.destructive,
            "idempotentHint": self.idempotent,
            "openWorldHint": self.open_world,
        })
    }
}

/// One entry in the operation catalog. Constructed once at startup from the
/// static registry list and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: InputSchema,
    pub annotations: ToolAnnotations,
}

impl ToolDescriptor {
    /// Render the descriptor into the MCP `tools/list` wire shape.
    pub fn to_mcp_json(&self) -> Value {
        json!({
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "inputSchema": self.input_schema.to_json_schema(),
            "annotations": self.annotations.to_json(),
        })
    }
}

/// A single block of tool output. Only text content is produced today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// The uniform success/error envelope returned by the dispatcher.
///
/// # Invariants
///
/// - Every tool invocation produces exactly one `CallResult`; no raw error
///   escapes the dispatcher boundary.
/// - `is_error` is the only signal of failure; error text lives in
///   `content` like any other output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }

    /// The concatenated text content, used by tests and the stdio transport.
    pub fn rendered(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Failures produced below the dispatcher boundary.
///
/// The `Display` text of each variant is exactly what callers see inside
/// the error `CallResult` (prefixed with `Error: ` by the dispatcher), so
/// message wording here is contract, not cosmetics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// A declared input constraint was violated before any network call.
    #[error("{0}")]
    InvalidInput(String),

    /// The operation name is not in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The accelerator service failed; carries the remote message verbatim.
    #[error("{0}")]
    Remote(String),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_result_wire_shape() {
        let result = CallResult::text("done");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "done");
        assert_eq!(value["isError"], false);

        let err = CallResult::error("Error: boom");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["text"], "Error: boom");
    }

    #[test]
    fn test_tool_error_messages_are_verbatim() {
        let err = ToolError::Remote("Network error".to_string());
        assert_eq!(err.to_string(), "Network error");

        let err = ToolError::UnknownTool("s2t_does_not_exist".to_string());
        assert_eq!(err.to_string(), "Unknown tool: s2t_does_not_exist");
    }
}
