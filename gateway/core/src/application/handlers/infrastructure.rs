// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure accelerators: template synthesis, DynamoDB single-table
//! design, cost estimation.

use serde_json::json;

use super::{bullet_list, f64_at, field, items_at, str_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

pub async fn generate_template(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "description": args.str("description")?,
        "format": args.str_or("format", "terraform"),
        "region": args.str_or("region", "us-east-1"),
    });

    let response = client.post("/api/infrastructure/template", &payload).await?;

    let mut out = String::from("# Infrastructure Template\n\n");
    field(&mut out, "Format", str_at(&response, "/format"));
    field(&mut out, "Region", str_at(&response, "/region"));

    let resources = items_at(&response, "/resources");
    out.push_str(&format!("\n## Resources ({})\n", resources.len()));
    bullet_list(&mut out, resources);

    let warnings = items_at(&response, "/warnings");
    if !warnings.is_empty() {
        out.push_str("\n## Warnings\n");
        bullet_list(&mut out, warnings);
    }

    out.push_str("\n## Template\n```\n");
    out.push_str(str_at(&response, "/template"));
    out.push_str("\n```\n");
    Ok(out)
}

pub async fn design_dynamodb_schema(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "access_patterns": args.string_array("access_patterns")?,
    });
    if let Ok(entities) = args.object("entity_model") {
        payload["entity_model"] = entities.clone();
    }

    let response = client
        .post("/api/infrastructure/dynamodb/design", &payload)
        .await?;

    let mut out = String::from("# DynamoDB Schema Design\n\n");
    for table in items_at(&response, "/tables") {
        out.push_str(&format!("## Table: {}\n", str_at(table, "/name")));
        field(&mut out, "Partition key", str_at(table, "/partition_key"));
        if let Some(sort_key) = table.pointer("/sort_key").and_then(|v| v.as_str()) {
            field(&mut out, "Sort key", sort_key);
        }
        let gsis = items_at(table, "/global_secondary_indexes");
        if !gsis.is_empty() {
            out.push_str("**GSIs:**\n");
            bullet_list(&mut out, gsis);
        }
        out.push('\n');
    }

    let notes = items_at(&response, "/notes");
    if !notes.is_empty() {
        out.push_str("## Design Notes\n");
        bullet_list(&mut out, notes);
    }
    Ok(out)
}

pub async fn estimate_costs(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "template": args.str("template")?,
        "region": args.str_or("region", "us-east-1"),
    });

    let response = client
        .post("/api/infrastructure/costs/estimate", &payload)
        .await?;

    let mut out = String::from("# Cost Estimate\n\n");
    field(
        &mut out,
        "Estimated monthly",
        format!("${:.2}", f64_at(&response, "/monthly_usd")),
    );
    field(&mut out, "Region", str_at(&response, "/region"));

    let line_items = items_at(&response, "/line_items");
    if !line_items.is_empty() {
        out.push_str("\n## Line Items\n");
        for item in line_items {
            out.push_str(&format!(
                "- {}: ${:.2}/mo\n",
                str_at(item, "/resource"),
                f64_at(item, "/monthly_usd"),
            ));
        }
    }

    let assumptions = items_at(&response, "/assumptions");
    if !assumptions.is_empty() {
        out.push_str("\n## Assumptions\n");
        bullet_list(&mut out, assumptions);
    }
    Ok(out)
}
