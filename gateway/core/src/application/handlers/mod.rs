// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Per-operation handlers: validate, forward, format.
//!
//! Every handler follows the same shape: read the already-validated
//! arguments, forward a normalized payload to the accelerator client at
//! the operation's fixed endpoint, and render the JSON result into a text
//! document. Formatting is pure: identical input produces identical
//! output, with no timestamps or randomness introduced here.

pub mod agent_ops;
pub mod embeddings;
pub mod governance;
pub mod infrastructure;
pub mod interview;
pub mod operations;
pub mod security;

use serde_json::Value;

/// String at a JSON pointer, `"unknown"` when absent or not a string.
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

pub(crate) fn u64_at(value: &Value, pointer: &str) -> u64 {
    value.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn f64_at(value: &Value, pointer: &str) -> f64 {
    value.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0)
}

pub(crate) fn bool_at(value: &Value, pointer: &str) -> bool {
    value
        .pointer(pointer)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Array at a JSON pointer, empty when absent.
pub(crate) fn items_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Render an array of strings as a markdown bullet list.
pub(crate) fn bullet_list(out: &mut String, items: &[Value]) {
    for item in items {
        if let Some(text) = item.as_str() {
            out.push_str("- ");
            out.push_str(text);
            out.push('\n');
        }
    }
}

pub(crate) fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("**{}:** {}\n", label, value));
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub(crate) fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

/// Split text into fixed-size character chunks. The final chunk carries
/// the remainder; a non-empty input always yields at least one chunk.
pub(crate) fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_preview_adds_three_char_marker() {
        let text = "A".repeat(150);
        let preview = truncate_preview(&text, 100);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));

        // Short input passes through untouched.
        assert_eq!(truncate_preview("short", 100), "short");
        // Exactly at the limit is not truncated.
        assert_eq!(truncate_preview(&"B".repeat(100), 100).len(), 100);
    }

    #[test]
    fn test_chunk_text_boundaries() {
        assert_eq!(chunk_text(&"A".repeat(150), 1000).len(), 1);
        assert_eq!(chunk_text(&"A".repeat(2500), 1000).len(), 3);
        let chunks = chunk_text(&"A".repeat(2500), 1000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn test_pointer_accessors_default_gracefully() {
        let value = json!({ "a": { "b": "x" }, "n": 3 });
        assert_eq!(str_at(&value, "/a/b"), "x");
        assert_eq!(str_at(&value, "/missing"), "unknown");
        assert_eq!(u64_at(&value, "/n"), 3);
        assert_eq!(u64_at(&value, "/missing"), 0);
        assert!(items_at(&value, "/missing").is_empty());
    }
}
