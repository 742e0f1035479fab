// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent orchestration primitives: the task queue, the shared memory
//! store, distributed-trace contexts, and advisory file locks. These are
//! thin pass-throughs to the accelerator's coordination plane.

use serde_json::json;

use super::{bool_at, bullet_list, field, items_at, str_at, u64_at};
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;
use crate::infrastructure::accelerator_client::AcceleratorClient;

// --- task queue ---

pub async fn enqueue_task(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "task": args.str("task")?,
        "priority": args.str_or("priority", "normal"),
    });
    if let Some(agent_id) = args.opt_str("agent_id") {
        payload["agent_id"] = json!(agent_id);
    }
    if let Some(deps) = args.opt_string_array("depends_on") {
        payload["depends_on"] = json!(deps);
    }

    let response = client.post("/api/agents/tasks/enqueue", &payload).await?;

    let mut out = String::from("# Task Enqueued\n\n");
    field(&mut out, "Task ID", str_at(&response, "/task_id"));
    field(&mut out, "Queue position", u64_at(&response, "/position"));
    Ok(out)
}

pub async fn list_tasks(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let status = args.str_or("status", "pending");
    let response = client
        .get(&format!("/api/agents/tasks?status={}", status))
        .await?;

    let tasks = items_at(&response, "/tasks");
    let mut out = String::from("# Agent Tasks\n\n");
    field(&mut out, "Status filter", status);
    field(&mut out, "Count", tasks.len());
    for task in tasks {
        out.push_str(&format!(
            "\n- **{}** [{}] {}\n",
            str_at(task, "/task_id"),
            str_at(task, "/priority"),
            str_at(task, "/task"),
        ));
    }
    Ok(out)
}

pub async fn claim_task(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({ "agent_id": args.str("agent_id")? });
    if let Some(capabilities) = args.opt_string_array("capabilities") {
        payload["capabilities"] = json!(capabilities);
    }

    let response = client.post("/api/agents/tasks/claim", &payload).await?;

    let mut out = String::from("# Task Claimed\n\n");
    let task_id = str_at(&response, "/task_id");
    if task_id == "unknown" {
        out.push_str("No eligible task in the queue.\n");
    } else {
        field(&mut out, "Task ID", task_id);
        field(&mut out, "Task", str_at(&response, "/task"));
    }
    Ok(out)
}

pub async fn complete_task(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "task_id": args.str("task_id")?,
        "result": args.str("result")?,
    });
    if let Some(output) = args.opt_str("output") {
        payload["output"] = json!(output);
    }

    let response = client.post("/api/agents/tasks/complete", &payload).await?;

    let mut out = String::from("# Task Completed\n\n");
    field(&mut out, "Task ID", str_at(&response, "/task_id"));
    field(&mut out, "Recorded result", str_at(&response, "/result"));
    field(&mut out, "Unblocked tasks", u64_at(&response, "/unblocked"));
    Ok(out)
}

pub async fn task_status(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let task_id = args.str("task_id")?;
    let response = client
        .get(&format!("/api/agents/tasks/{}", task_id))
        .await?;

    let mut out = String::from("# Task Status\n\n");
    field(&mut out, "Task ID", str_at(&response, "/task_id"));
    field(&mut out, "Status", str_at(&response, "/status"));
    field(&mut out, "Assigned to", str_at(&response, "/agent_id"));
    let blockers = items_at(&response, "/blocked_by");
    if !blockers.is_empty() {
        out.push_str("\n## Blocked By\n");
        bullet_list(&mut out, blockers);
    }
    Ok(out)
}

// --- agent memory ---

pub async fn store_memory(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({
        "key": args.str("key")?,
        "content": args.str("content")?,
        "namespace": args.str_or("namespace", "default"),
    });
    if let Some(tags) = args.opt_string_array("tags") {
        payload["tags"] = json!(tags);
    }

    let response = client.post("/api/agents/memory/store", &payload).await?;

    let mut out = String::from("# Memory Stored\n\n");
    field(&mut out, "Key", str_at(&response, "/key"));
    field(&mut out, "Namespace", str_at(&response, "/namespace"));
    field(&mut out, "Revision", u64_at(&response, "/revision"));
    Ok(out)
}

pub async fn retrieve_memory(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let key = args.str("key")?;
    let namespace = args.str_or("namespace", "default");
    let response = client
        .get(&format!("/api/agents/memory/{}/{}", namespace, key))
        .await?;

    let mut out = String::from("# Memory Entry\n\n");
    field(&mut out, "Key", str_at(&response, "/key"));
    field(&mut out, "Namespace", str_at(&response, "/namespace"));
    out.push_str(&format!("\n{}\n", str_at(&response, "/content")));
    Ok(out)
}

pub async fn search_memory(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "query": args.str("query")?,
        "namespace": args.str_or("namespace", "default"),
        "limit": args.i64_or("limit", 10),
    });

    let response = client.post("/api/agents/memory/search", &payload).await?;

    let results = items_at(&response, "/results");
    let mut out = String::from("# Memory Search\n\n");
    field(&mut out, "Matches", results.len());
    for entry in results {
        out.push_str(&format!(
            "\n- **{}** (score {:.2})\n  {}\n",
            str_at(entry, "/key"),
            super::f64_at(entry, "/score"),
            str_at(entry, "/snippet"),
        ));
    }
    Ok(out)
}

pub async fn delete_memory(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let key = args.str("key")?;
    let namespace = args.str_or("namespace", "default");
    let response = client
        .delete(&format!("/api/agents/memory/{}/{}", namespace, key))
        .await?;

    let mut out = String::from("# Memory Deleted\n\n");
    field(&mut out, "Key", key);
    field(&mut out, "Namespace", namespace);
    field(&mut out, "Deleted", bool_at(&response, "/deleted"));
    Ok(out)
}

// --- distributed tracing ---

pub async fn create_trace_context(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let mut payload = json!({ "operation": args.str("operation")? });
    if let Some(parent) = args.opt_str("parent_trace_id") {
        payload["parent_trace_id"] = json!(parent);
    }

    let response = client.post("/api/agents/trace/create", &payload).await?;

    let mut out = String::from("# Trace Context\n\n");
    field(&mut out, "Trace ID", str_at(&response, "/trace_id"));
    field(&mut out, "Traceparent", str_at(&response, "/traceparent"));
    Ok(out)
}

pub async fn propagate_trace_context(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "traceparent": args.str("traceparent")?,
        "operation": args.str("operation")?,
    });

    let response = client.post("/api/agents/trace/propagate", &payload).await?;

    let mut out = String::from("# Trace Context Propagated\n\n");
    field(&mut out, "Span ID", str_at(&response, "/span_id"));
    field(&mut out, "Traceparent", str_at(&response, "/traceparent"));
    Ok(out)
}

// --- advisory file locks ---

pub async fn acquire_file_lock(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "path": args.str("path")?,
        "holder": args.str("holder")?,
        "ttl_seconds": args.i64_or("ttl_seconds", 300),
    });

    let response = client.post("/api/agents/locks/acquire", &payload).await?;

    let mut out = String::from("# File Lock\n\n");
    field(&mut out, "Acquired", bool_at(&response, "/acquired"));
    field(&mut out, "Path", str_at(&response, "/path"));
    let holder = str_at(&response, "/held_by");
    if holder != "unknown" {
        field(&mut out, "Held by", holder);
    }
    Ok(out)
}

pub async fn release_file_lock(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let payload = json!({
        "path": args.str("path")?,
        "holder": args.str("holder")?,
    });

    let response = client.post("/api/agents/locks/release", &payload).await?;

    let mut out = String::from("# File Lock Released\n\n");
    field(&mut out, "Path", str_at(&response, "/path"));
    field(&mut out, "Released", bool_at(&response, "/released"));
    Ok(out)
}

pub async fn check_file_lock(
    client: &AcceleratorClient,
    args: &ToolArguments,
) -> Result<String, ToolError> {
    let path = args.str("path")?;
    let response = client
        .get(&format!("/api/agents/locks/check?path={}", path))
        .await?;

    let mut out = String::from("# File Lock Status\n\n");
    field(&mut out, "Path", path);
    field(&mut out, "Locked", bool_at(&response, "/locked"));
    let holder = str_at(&response, "/held_by");
    if holder != "unknown" {
        field(&mut out, "Held by", holder);
        field(&mut out, "Expires in", format!("{}s", u64_at(&response, "/ttl_remaining")));
    }
    Ok(out)
}
