// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding generation.
//!
//! Text is chunked locally before forwarding so chunk indices and previews
//! are deterministic regardless of what the remote returns; the service
//! answers with one vector descriptor per submitted chunk.

use serde_json::{json, Value};

use super::{field, truncate_preview, u64_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

const ENDPOINT: &str = "/api/embeddings/generate";
const PREVIEW_CHARS: usize = 100;

pub async fn generate_embeddings(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let text = args.str("text")?;
    let model = args.str_or("model", "titan-embed-v2").to_string();
    let chunk_size = args.i64_or("chunk_size", 1000).max(1) as usize;
    let normalize = args.bool_or("normalize", true);

    let chunks = super::chunk_text(text, chunk_size);
    let payload = json!({
        "chunks": chunks,
        "model": model,
        "normalize": normalize,
    });

    let response = client.post(ENDPOINT, &payload).await?;
    Ok(format_embeddings(&model, &chunks, &response))
}

fn format_embeddings(model: &str, chunks: &[String], response: &Value) -> String {
    let embeddings = super::items_at(response, "/embeddings");

    let mut out = String::from("# Embeddings Generated\n\n");
    let reported_model = response.pointer("/model").and_then(Value::as_str);
    field(&mut out, "Model", reported_model.unwrap_or(model));
    field(&mut out, "Chunks", chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("\n## Chunk {}\n", index));
        if let Some(embedding) = embeddings.get(index) {
            field(&mut out, "Dimensions", u64_at(embedding, "/dimensions"));
        }
        field(&mut out, "Preview", truncate_preview(chunk, PREVIEW_CHARS));
    }

    if let Some(usage) = response.pointer("/usage") {
        out.push('\n');
        field(&mut out, "Input tokens", u64_at(usage, "/input_tokens"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_chunk_preview_is_truncated_to_103_chars() {
        let chunks = super::super::chunk_text(&"A".repeat(150), 1000);
        assert_eq!(chunks.len(), 1);

        let response = json!({
            "model": "titan-embed-v2",
            "embeddings": [{ "dimensions": 1024 }],
        });
        let text = format_embeddings("titan-embed-v2", &chunks, &response);

        assert!(text.contains("## Chunk 0"));
        assert!(text.contains("**Chunks:** 1"));
        assert!(text.contains("**Dimensions:** 1024"));
        let preview_line = text
            .lines()
            .find(|l| l.starts_with("**Preview:**"))
            .unwrap();
        let preview = preview_line.trim_start_matches("**Preview:** ");
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let chunks = super::super::chunk_text(&"B".repeat(2500), 1000);
        let response = json!({
            "model": "titan-embed-v2",
            "embeddings": [
                { "dimensions": 1024 },
                { "dimensions": 1024 },
                { "dimensions": 1024 },
            ],
        });
        let first = format_embeddings("titan-embed-v2", &chunks, &response);
        let second = format_embeddings("titan-embed-v2", &chunks, &response);
        assert_eq!(first, second);
        assert!(first.contains("## Chunk 2"));
    }
}
