// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Security accelerators. All scoring and rule evaluation happens on the
//! remote service; these handlers shape the request and render findings.

use serde_json::json;

use super::{bullet_list, f64_at, field, items_at, str_at, u64_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

pub async fn validate_iam_policy(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "policy_document": args.object("policy_document")?,
        "context": args.str_or("context", "identity"),
    });

    let response = client.post("/api/security/iam/validate", &payload).await?;

    let mut out = String::from("# IAM Policy Validation\n\n");
    field(&mut out, "Score", format!("{}/100", u64_at(&response, "/score")));

    let findings = items_at(&response, "/findings");
    out.push_str(&format!("\n## Findings ({})\n", findings.len()));
    for finding in findings {
        out.push_str(&format!(
            "- [{}] {}\n",
            str_at(finding, "/severity").to_uppercase(),
            str_at(finding, "/message"),
        ));
    }
    Ok(out)
}

pub async fn validate_oauth_config(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "provider": args.str("provider")?,
        "config": args.object("config")?,
    });

    let response = client.post("/api/security/oauth/validate", &payload).await?;

    let mut out = String::from("# OAuth Configuration Review\n\n");
    field(&mut out, "Provider", str_at(&response, "/provider"));

    for (heading, pointer) in [
        ("Errors", "/errors"),
        ("Warnings", "/warnings"),
        ("Recommendations", "/recommendations"),
    ] {
        let entries = items_at(&response, pointer);
        out.push_str(&format!("\n## {} ({})\n", heading, entries.len()));
        bullet_list(&mut out, entries);
    }
    Ok(out)
}

pub async fn scan_dependencies(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "manifest": args.str("manifest")?,
        "ecosystem": args.str("ecosystem")?,
    });

    let response = client
        .post("/api/security/dependencies/scan", &payload)
        .await?;

    let vulnerabilities = items_at(&response, "/vulnerabilities");
    let mut out = String::from("# Dependency Scan\n\n");
    field(&mut out, "Ecosystem", str_at(&response, "/ecosystem"));
    field(&mut out, "Vulnerabilities", vulnerabilities.len());

    for vuln in vulnerabilities {
        out.push_str(&format!(
            "\n- **{}** [{}] in `{}`",
            str_at(vuln, "/id"),
            str_at(vuln, "/severity").to_uppercase(),
            str_at(vuln, "/package"),
        ));
        if let Some(fixed) = vuln.pointer("/fixed_in").and_then(|v| v.as_str()) {
            out.push_str(&format!(", fixed in {}", fixed));
        }
        out.push('\n');
    }
    Ok(out)
}

pub async fn scan_secrets(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({ "content": args.str("content")? });
    if let Some(hint) = args.opt_str("path_hint") {
        payload["path_hint"] = json!(hint);
    }

    let response = client.post("/api/security/secrets/scan", &payload).await?;

    let matches = items_at(&response, "/matches");
    let mut out = String::from("# Secret Scan\n\n");
    field(&mut out, "Matches", matches.len());
    for hit in matches {
        out.push_str(&format!(
            "- line {}: {} (entropy {:.2})\n",
            u64_at(hit, "/line"),
            str_at(hit, "/rule"),
            f64_at(hit, "/entropy"),
        ));
    }
    if matches.is_empty() {
        out.push_str("\nNo secrets detected.\n");
    }
    Ok(out)
}

pub async fn scan_infrastructure(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "template": args.str("template")?,
        "format": args.str_or("format", "terraform"),
    });

    let response = client
        .post("/api/security/infrastructure/scan", &payload)
        .await?;

    let findings = items_at(&response, "/findings");
    let mut out = String::from("# Infrastructure Security Scan\n\n");
    field(&mut out, "Findings", findings.len());
    for finding in findings {
        out.push_str(&format!(
            "- [{}] {} ({})\n",
            str_at(finding, "/severity").to_uppercase(),
            str_at(finding, "/message"),
            str_at(finding, "/resource"),
        ));
    }
    Ok(out)
}
