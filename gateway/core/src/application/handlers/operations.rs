// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Operational accelerators: error-pattern clustering, platform status,
//! CLI readiness.

use serde_json::json;

use super::{bool_at, bullet_list, field, items_at, str_at, u64_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

pub async fn analyze_error_patterns(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "logs": args.string_array("logs")?,
        "window_minutes": args.i64_or("window_minutes", 60),
    });

    let response = client
        .post("/api/operations/errors/analyze", &payload)
        .await?;

    let clusters = items_at(&response, "/clusters");
    let mut out = String::from("# Error Pattern Analysis\n\n");
    field(&mut out, "Clusters", clusters.len());

    for cluster in clusters {
        out.push_str(&format!(
            "\n## {} ({} occurrences, {})\n",
            str_at(cluster, "/pattern"),
            u64_at(cluster, "/count"),
            str_at(cluster, "/severity"),
        ));
        let example = str_at(cluster, "/example");
        if example != "unknown" {
            out.push_str(&format!("Example: `{}`\n", example));
        }
    }
    Ok(out)
}

/// Liveness probe of the accelerator platform itself. Takes no input.
pub async fn accelerator_status(
    client: &AcceleratorClient,
    _args: &ToolArguments,
) -> Result<String, ToolError> {
    let response = client.get("/api/status").await?;

    let mut out = String::from("# Accelerator Platform Status\n\n");
    field(&mut out, "Status", str_at(&response, "/status"));
    field(&mut out, "Version", str_at(&response, "/version"));

    let degraded = items_at(&response, "/degraded_services");
    if !degraded.is_empty() {
        out.push_str("\n## Degraded Services\n");
        bullet_list(&mut out, degraded);
    }
    Ok(out)
}

pub async fn check_cli_readiness(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "tools": args
            .opt_string_array("tools")
            .unwrap_or_else(|| vec!["git", "docker", "terraform"]),
    });
    if let Some(root) = args.opt_str("workspace_root") {
        payload["workspace_root"] = json!(root);
    }

    let response = client.post("/api/agents/cli/readiness", &payload).await?;

    let mut out = String::from("# CLI Readiness\n\n");
    field(&mut out, "Ready", bool_at(&response, "/ready"));
    for check in items_at(&response, "/checks") {
        out.push_str(&format!(
            "- {}: {}\n",
            str_at(check, "/tool"),
            str_at(check, "/status"),
        ));
    }

    let remediation = items_at(&response, "/remediation");
    if !remediation.is_empty() {
        out.push_str("\n## Remediation\n");
        bullet_list(&mut out, remediation);
    }
    Ok(out)
}
