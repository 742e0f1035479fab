// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! The operation catalog.
//!
//! An ordered, immutable list of [`ToolDescriptor`]s built once at startup
//! and shared by every dispatcher instance. Lookup is exact-name and
//! case-sensitive; unknown names are the dispatcher's problem, not the
//! registry's.

use serde_json::json;

use crate::domain::schema::{FieldSpec, InputSchema};
use crate::domain::tool::{ToolAnnotations, ToolDescriptor};

/// The ordered catalog plus a name index.
#[derive(Debug)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: catalog(),
        }
    }

    /// Full catalog in declaration order, returned verbatim to
    /// `tools/list`.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Exact-name lookup; no fuzzy matching.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const ENVIRONMENTS: &[&str] = &["local", "staging", "production"];

fn catalog() -> Vec<ToolDescriptor> {
    vec![
        // --- embeddings ---
        ToolDescriptor {
            name: "s2t_generate_embeddings",
            title: "Generate Embeddings",
            description: "Chunk text and generate embedding vectors via the accelerator embedding service.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("text", "Text to embed"),
                FieldSpec::string("model", "Embedding model identifier")
                    .with_default(json!("titan-embed-v2")),
                FieldSpec::bounded_integer("chunk_size", "Characters per chunk", 100, 8000)
                    .with_default(json!(1000)),
                FieldSpec::boolean("normalize", "L2-normalize the returned vectors")
                    .with_default(json!(true)),
            ]),
            annotations: ToolAnnotations::idempotent(),
        },
        // --- infrastructure ---
        ToolDescriptor {
            name: "s2t_generate_infrastructure_template",
            title: "Generate Infrastructure Template",
            description: "Synthesize an infrastructure-as-code template from a natural-language description.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("description", "What the infrastructure should provide"),
                FieldSpec::enumeration("format", "Template dialect", &["terraform", "cloudformation", "cdk"])
                    .with_default(json!("terraform")),
                FieldSpec::string("region", "Target region").with_default(json!("us-east-1")),
            ]),
            annotations: ToolAnnotations::idempotent(),
        },
        ToolDescriptor {
            name: "s2t_design_dynamodb_schema",
            title: "Design DynamoDB Schema",
            description: "Produce a single-table DynamoDB design from declared access patterns.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string_array("access_patterns", "Access patterns the design must serve"),
                FieldSpec::object("entity_model", "Optional entity/relationship model").optional(),
            ]),
            annotations: ToolAnnotations::idempotent(),
        },
        ToolDescriptor {
            name: "s2t_estimate_costs",
            title: "Estimate Infrastructure Costs",
            description: "Estimate monthly cost for an infrastructure template.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("template", "Infrastructure template source"),
                FieldSpec::string("region", "Pricing region").with_default(json!("us-east-1")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        // --- security ---
        ToolDescriptor {
            name: "s2t_validate_iam_policy",
            title: "Validate IAM Policy",
            description: "Score an IAM policy document and report findings by severity.",
            input_schema: InputSchema::new(vec![
                FieldSpec::object("policy_document", "IAM policy document (JSON)"),
                FieldSpec::enumeration("context", "Policy attachment context", &["identity", "resource", "scp"])
                    .with_default(json!("identity")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_validate_oauth_config",
            title: "Validate OAuth Configuration",
            description: "Check an OAuth provider configuration for errors, warnings, and recommendations.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("provider", "OAuth provider name"),
                FieldSpec::object("config", "Provider configuration to validate"),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_scan_dependencies",
            title: "Scan Dependencies",
            description: "Scan a dependency manifest for known vulnerabilities.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("manifest", "Manifest file contents"),
                FieldSpec::enumeration("ecosystem", "Package ecosystem", &["cargo", "npm", "pip", "maven"]),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_scan_secrets",
            title: "Scan for Secrets",
            description: "Detect credential material in file content.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("content", "Content to scan"),
                FieldSpec::string("path_hint", "Origin path, used for rule selection").optional(),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_scan_infrastructure",
            title: "Scan Infrastructure Template",
            description: "Run security rules against an infrastructure template.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("template", "Template source to scan"),
                FieldSpec::enumeration("format", "Template dialect", &["terraform", "cloudformation", "cdk"])
                    .with_default(json!("terraform")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        // --- operations ---
        ToolDescriptor {
            name: "s2t_analyze_error_patterns",
            title: "Analyze Error Patterns",
            description: "Cluster log lines into recurring error patterns.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string_array("logs", "Log lines to cluster"),
                FieldSpec::bounded_integer("window_minutes", "Analysis window", 1, 1440)
                    .with_default(json!(60)),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_get_accelerator_status",
            title: "Accelerator Platform Status",
            description: "Report accelerator platform liveness and degraded services.",
            input_schema: InputSchema::empty(),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_check_cli_readiness",
            title: "Check CLI Readiness",
            description: "Verify the local toolchain prerequisites an agent workflow needs.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string_array("tools", "CLI tools to verify").optional(),
                FieldSpec::string("workspace_root", "Workspace to inspect").optional(),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        // --- governance ---
        ToolDescriptor {
            name: "s2t_classify_governance_decision",
            title: "Classify Governance Decision",
            description: "Classify a proposed action as APPROVE, ESCALATE, or BLOCK with confidence and reasoning.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action under review"),
                FieldSpec::enumeration("environment", "Target environment", ENVIRONMENTS)
                    .with_default(json!("local")),
                FieldSpec::string("reason", "Caller-supplied rationale").optional(),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_assess_financial_impact",
            title: "Assess Financial Impact",
            description: "Gate an action on its estimated financial impact.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action under review"),
                FieldSpec::number("estimated_cost_usd", "Estimated cost in USD").optional(),
                FieldSpec::number("budget_remaining_usd", "Remaining budget in USD").optional(),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_check_compliance",
            title: "Check Compliance",
            description: "Evaluate an action against compliance frameworks.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action under review"),
                FieldSpec::string_array("frameworks", "Frameworks to evaluate")
                    .with_default(json!(["soc2"])),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_dispatch_domain_reviews",
            title: "Dispatch Domain Reviews",
            description: "Fan an action out to parallel per-domain reviewers.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action under review"),
                FieldSpec::string_array("domains", "Review domains")
                    .with_default(json!(["security", "cost", "reliability"])),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_synthesize_domain_reviews",
            title: "Synthesize Domain Reviews",
            description: "Combine dispatched domain reviews into a single decision.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("review_id", "Identifier returned by dispatch"),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_search_precedents",
            title: "Search Decision Precedents",
            description: "Find previously recorded decisions similar to a query.",
            input_schema: InputSchema::new(vec![
                FieldSpec::bounded_string("query", "Similarity query", 500),
                FieldSpec::bounded_integer("limit", "Maximum matches", 1, 50)
                    .with_default(json!(10)),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_record_outcome",
            title: "Record Decision Outcome",
            description: "Record how a governed action actually turned out, feeding the precedent store.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The governed action"),
                FieldSpec::enumeration("decision", "Decision that was made", &["APPROVE", "ESCALATE", "BLOCK"]),
                FieldSpec::enumeration("outcome", "Observed outcome", &["success", "failure", "rolled_back"]),
                FieldSpec::string("notes", "Free-form notes").optional(),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_estimate_blast_radius",
            title: "Estimate Blast Radius",
            description: "Estimate the failure domain of an action before it runs.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action under review"),
                FieldSpec::enumeration("environment", "Target environment", ENVIRONMENTS)
                    .with_default(json!("local")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_generate_rollback_plan",
            title: "Generate Rollback Plan",
            description: "Produce an ordered rollback plan for an action.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("action", "The action to plan rollback for"),
                FieldSpec::enumeration("environment", "Target environment", ENVIRONMENTS)
                    .with_default(json!("local")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        // --- agent orchestration ---
        ToolDescriptor {
            name: "s2t_enqueue_agent_task",
            title: "Enqueue Agent Task",
            description: "Add a task to the shared agent work queue.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("task", "Task description"),
                FieldSpec::string("agent_id", "Preferred agent").optional(),
                FieldSpec::enumeration("priority", "Queue priority", &["low", "normal", "high"])
                    .with_default(json!("normal")),
                FieldSpec::string_array("depends_on", "Task ids that must complete first").optional(),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_list_agent_tasks",
            title: "List Agent Tasks",
            description: "List queued tasks, filtered by status.",
            input_schema: InputSchema::new(vec![
                FieldSpec::enumeration("status", "Status filter", &["pending", "claimed", "completed", "failed"])
                    .with_default(json!("pending")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_claim_agent_task",
            title: "Claim Agent Task",
            description: "Claim the next eligible task for an agent.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("agent_id", "Claiming agent"),
                FieldSpec::string_array("capabilities", "Capabilities the agent offers").optional(),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_complete_agent_task",
            title: "Complete Agent Task",
            description: "Mark a claimed task as finished and release its dependents.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("task_id", "Task being completed"),
                FieldSpec::enumeration("result", "Terminal result", &["success", "failure"]),
                FieldSpec::string("output", "Result payload").optional(),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_get_task_status",
            title: "Get Task Status",
            description: "Fetch one task's lifecycle state.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("task_id", "Task to inspect"),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_store_agent_memory",
            title: "Store Agent Memory",
            description: "Write an entry to the shared agent memory store.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("key", "Entry key"),
                FieldSpec::string("content", "Entry content"),
                FieldSpec::string("namespace", "Memory namespace").with_default(json!("default")),
                FieldSpec::string_array("tags", "Searchable tags").optional(),
            ]),
            annotations: ToolAnnotations::idempotent(),
        },
        ToolDescriptor {
            name: "s2t_retrieve_agent_memory",
            title: "Retrieve Agent Memory",
            description: "Read one memory entry by key.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("key", "Entry key"),
                FieldSpec::string("namespace", "Memory namespace").with_default(json!("default")),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_search_agent_memory",
            title: "Search Agent Memory",
            description: "Search memory entries by semantic similarity.",
            input_schema: InputSchema::new(vec![
                FieldSpec::bounded_string("query", "Search query", 500),
                FieldSpec::string("namespace", "Memory namespace").with_default(json!("default")),
                FieldSpec::bounded_integer("limit", "Maximum matches", 1, 50)
                    .with_default(json!(10)),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        ToolDescriptor {
            name: "s2t_delete_agent_memory",
            title: "Delete Agent Memory",
            description: "Delete one memory entry by key.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("key", "Entry key"),
                FieldSpec::string("namespace", "Memory namespace").with_default(json!("default")),
            ]),
            annotations: ToolAnnotations::destructive(),
        },
        ToolDescriptor {
            name: "s2t_create_trace_context",
            title: "Create Trace Context",
            description: "Mint a distributed-trace context for a multi-agent operation.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("operation", "Operation name"),
                FieldSpec::string("parent_trace_id", "Parent trace to nest under").optional(),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_propagate_trace_context",
            title: "Propagate Trace Context",
            description: "Derive a child span from an existing traceparent.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("traceparent", "W3C traceparent header value"),
                FieldSpec::string("operation", "Operation name for the child span"),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_acquire_file_lock",
            title: "Acquire File Lock",
            description: "Take an advisory lock on a path for coordinated multi-agent edits.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("path", "Path to lock"),
                FieldSpec::string("holder", "Lock holder identity"),
                FieldSpec::bounded_integer("ttl_seconds", "Lock time-to-live", 1, 3600)
                    .with_default(json!(300)),
            ]),
            annotations: ToolAnnotations::mutating(),
        },
        ToolDescriptor {
            name: "s2t_release_file_lock",
            title: "Release File Lock",
            description: "Release an advisory lock held on a path.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("path", "Locked path"),
                FieldSpec::string("holder", "Lock holder identity"),
            ]),
            annotations: ToolAnnotations::destructive(),
        },
        ToolDescriptor {
            name: "s2t_check_file_lock",
            title: "Check File Lock",
            description: "Inspect whether a path is currently locked.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("path", "Path to inspect"),
            ]),
            annotations: ToolAnnotations::read_only(),
        },
        // --- local interview operations ---
        ToolDescriptor {
            name: "s2t_start_interview",
            title: "Start Requirements Interview",
            description: "Begin a scripted requirements interview. Purely local; no remote call.",
            input_schema: InputSchema::new(vec![
                FieldSpec::enumeration("topic", "Interview topic", &["infrastructure", "security", "governance"]),
            ]),
            annotations: ToolAnnotations::local(),
        },
        ToolDescriptor {
            name: "s2t_answer_interview",
            title: "Answer Interview Question",
            description: "Record an answer and advance the interview.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("interview_id", "Interview session id"),
                FieldSpec::string("answer", "Answer to the current question"),
            ]),
            annotations: ToolAnnotations::local(),
        },
        ToolDescriptor {
            name: "s2t_get_interview_status",
            title: "Get Interview Status",
            description: "Report interview progress.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("interview_id", "Interview session id"),
            ]),
            annotations: ToolAnnotations::local(),
        },
        ToolDescriptor {
            name: "s2t_finish_interview",
            title: "Finish Interview",
            description: "Summarize collected answers and discard the session.",
            input_schema: InputSchema::new(vec![
                FieldSpec::string("interview_id", "Interview session id"),
            ]),
            annotations: ToolAnnotations::local(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_size_and_uniqueness() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.len(), 39);

        let names: HashSet<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), registry.len(), "duplicate tool name in catalog");
    }

    #[test]
    fn test_every_name_carries_the_catalog_prefix() {
        for descriptor in ToolRegistry::new().descriptors() {
            assert!(
                descriptor.name.starts_with("s2t_"),
                "{} missing prefix",
                descriptor.name
            );
        }
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let registry = ToolRegistry::new();
        assert!(registry.get("s2t_generate_embeddings").is_some());
        assert!(registry.get("S2T_GENERATE_EMBEDDINGS").is_none());
        assert!(registry.get("s2t_generate_embedding").is_none());
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.descriptors()[0].name, "s2t_generate_embeddings");
        let listed: Vec<_> = ToolRegistry::new()
            .descriptors()
            .iter()
            .map(|d| d.name)
            .collect();
        let again: Vec<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(listed, again);
    }

    #[test]
    fn test_descriptors_render_valid_mcp_json() {
        for descriptor in ToolRegistry::new().descriptors() {
            let rendered = descriptor.to_mcp_json();
            assert_eq!(rendered["name"], descriptor.name);
            assert_eq!(rendered["inputSchema"]["type"], "object");
            assert!(rendered["annotations"]["readOnlyHint"].is_boolean());
        }
    }

    #[test]
    fn test_local_operations_are_annotated_closed_world() {
        let registry = ToolRegistry::new();
        for name in [
            "s2t_start_interview",
            "s2t_answer_interview",
            "s2t_get_interview_status",
            "s2t_finish_interview",
        ] {
            let descriptor = registry.get(name).unwrap();
            assert!(!descriptor.annotations.open_world, "{} is local", name);
        }
    }
}
