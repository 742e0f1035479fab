// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Governance accelerators: decision classification, financial gating,
//! compliance checks, multi-domain review, precedent search, outcome
//! recording, blast-radius and rollback planning.
//!
//! Classification payloads carry a `context` derived from the target
//! environment: anything short of `production` is forwarded as
//! `development`.

use serde_json::json;

use super::{bullet_list, f64_at, field, items_at, str_at, u64_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

/// Environment → remote `context` mapping.
fn context_for(environment: &str) -> &'static str {
    if environment == "production" {
        "production"
    } else {
        "development"
    }
}

pub async fn classify_decision(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let action = args.str("action")?;
    let environment = args.str_or("environment", "local");

    let mut payload = json!({
        "action": action,
        "environment": environment,
        "context": context_for(environment),
    });
    if let Some(reason) = args.opt_str("reason") {
        payload["reason"] = json!(reason);
    }

    let response = client.post("/api/governance/classify", &payload).await?;

    let mut out = String::from("# Governance Classification\n\n");
    field(&mut out, "Decision", str_at(&response, "/decision"));
    field(
        &mut out,
        "Confidence",
        format!("{:.0}%", f64_at(&response, "/confidence") * 100.0),
    );
    field(&mut out, "Environment", environment);
    out.push_str(&format!("\n## Reasoning\n{}\n", str_at(&response, "/reasoning")));
    Ok(out)
}

pub async fn assess_financial_impact(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({ "action": args.str("action")? });
    if let Some(cost) = args.opt_f64("estimated_cost_usd") {
        payload["estimated_cost_usd"] = json!(cost);
    }
    if let Some(budget) = args.opt_f64("budget_remaining_usd") {
        payload["budget_remaining_usd"] = json!(budget);
    }

    let response = client
        .post("/api/governance/financial/assess", &payload)
        .await?;

    let mut out = String::from("# Financial Impact Gate\n\n");
    field(&mut out, "Gate", str_at(&response, "/gate"));
    field(
        &mut out,
        "Threshold",
        format!("${:.2}", f64_at(&response, "/threshold_usd")),
    );
    out.push_str(&format!("\n{}\n", str_at(&response, "/rationale")));
    Ok(out)
}

pub async fn check_compliance(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "action": args.str("action")?,
        "frameworks": args
            .opt_string_array("frameworks")
            .unwrap_or_else(|| vec!["soc2"]),
    });

    let response = client
        .post("/api/governance/compliance/check", &payload)
        .await?;

    let mut out = String::from("# Compliance Check\n\n");
    for result in items_at(&response, "/results") {
        out.push_str(&format!(
            "## {}: {}\n",
            str_at(result, "/framework").to_uppercase(),
            str_at(result, "/status"),
        ));
        bullet_list(&mut out, items_at(result, "/controls"));
        out.push('\n');
    }
    Ok(out)
}

pub async fn dispatch_domain_reviews(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "action": args.str("action")?,
        "domains": args
            .opt_string_array("domains")
            .unwrap_or_else(|| vec!["security", "cost", "reliability"]),
    });

    let response = client
        .post("/api/governance/reviews/dispatch", &payload)
        .await?;

    let mut out = String::from("# Domain Reviews Dispatched\n\n");
    field(&mut out, "Review ID", str_at(&response, "/review_id"));
    let dispatched = items_at(&response, "/dispatched");
    field(&mut out, "Domains", dispatched.len());
    bullet_list(&mut out, dispatched);
    Ok(out)
}

pub async fn synthesize_domain_reviews(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({ "review_id": args.str("review_id")? });

    let response = client
        .post("/api/governance/reviews/synthesize", &payload)
        .await?;

    let mut out = String::from("# Review Synthesis\n\n");
    field(&mut out, "Decision", str_at(&response, "/decision"));

    out.push_str("\n## Domain Verdicts\n");
    for verdict in items_at(&response, "/domain_verdicts") {
        out.push_str(&format!(
            "- {}: {}\n",
            str_at(verdict, "/domain"),
            str_at(verdict, "/verdict"),
        ));
    }

    let dissent = items_at(&response, "/dissent");
    if !dissent.is_empty() {
        out.push_str("\n## Dissent\n");
        bullet_list(&mut out, dissent);
    }
    Ok(out)
}

pub async fn search_precedents(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "query": args.str("query")?,
        "limit": args.i64_or("limit", 10),
    });

    let response = client
        .post("/api/governance/precedents/search", &payload)
        .await?;

    let precedents = items_at(&response, "/precedents");
    let mut out = String::from("# Precedent Search\n\n");
    field(&mut out, "Matches", precedents.len());
    for precedent in precedents {
        out.push_str(&format!(
            "\n- **{}** → {} (similarity {:.2})\n  recorded {}\n",
            str_at(precedent, "/action"),
            str_at(precedent, "/decision"),
            f64_at(precedent, "/similarity"),
            str_at(precedent, "/recorded_at"),
        ));
    }
    Ok(out)
}

pub async fn record_outcome(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "action": args.str("action")?,
        "decision": args.str("decision")?,
        "outcome": args.str("outcome")?,
    });
    if let Some(notes) = args.opt_str("notes") {
        payload["notes"] = json!(notes);
    }

    let response = client
        .post("/api/governance/outcomes/record", &payload)
        .await?;

    let mut out = String::from("# Outcome Recorded\n\n");
    field(&mut out, "Outcome ID", str_at(&response, "/outcome_id"));
    field(&mut out, "Precedent count", u64_at(&response, "/precedent_count"));
    Ok(out)
}

pub async fn estimate_blast_radius(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let environment = args.str_or("environment", "local");
    let payload = json!({
        "action": args.str("action")?,
        "environment": environment,
    });

    let response = client.post("/api/governance/blast-radius", &payload).await?;

    let mut out = String::from("# Blast Radius Estimate\n\n");
    field(&mut out, "Radius", str_at(&response, "/radius"));
    field(&mut out, "Environment", environment);

    let affected = items_at(&response, "/affected_systems");
    out.push_str(&format!("\n## Affected Systems ({})\n", affected.len()));
    bullet_list(&mut out, affected);

    let notes = str_at(&response, "/notes");
    if notes != "unknown" {
        out.push_str(&format!("\n{}\n", notes));
    }
    Ok(out)
}

pub async fn generate_rollback_plan(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "action": args.str("action")?,
        "environment": args.str_or("environment", "local"),
    });

    let response = client
        .post("/api/governance/rollback/plan", &payload)
        .await?;

    let mut out = String::from("# Rollback Plan\n\n");
    field(
        &mut out,
        "Automatic rollback",
        response
            .pointer("/automatic")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    );
    field(
        &mut out,
        "Estimated duration",
        format!("{} min", u64_at(&response, "/estimated_minutes")),
    );

    out.push_str("\n## Steps\n");
    for (index, step) in items_at(&response, "/steps").iter().enumerate() {
        if let Some(text) = step.as_str() {
            out.push_str(&format!("{}. {}\n", index + 1, text));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_mapping() {
        assert_eq!(context_for("local"), "development");
        assert_eq!(context_for("staging"), "development");
        assert_eq!(context_for("production"), "production");
    }
}
