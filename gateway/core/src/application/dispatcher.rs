// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Tool Dispatcher
//!
//! The single chokepoint between transports and operation handlers.
//! [`Dispatcher::invoke`] is total: any operation name and any argument
//! bag (malformed, empty, or unknown) produces a [`CallResult`], never a
//! propagated error. This is the main correctness guarantee of the whole
//! dispatch path; transports can treat every tool call as infallible.
//!
//! A dispatcher is cheap to construct and is built once per transport
//! session. The registry and accelerator client are shared via `Arc`; the
//! interview store is the only per-dispatcher state, giving each session
//! an isolated interview namespace.

use std::sync::Arc;

use serde_json::Value;

use crate::application::handlers::{
    agent_ops, embeddings, governance, infrastructure, interview, operations, security,
};
use crate::application::handlers::interview::InterviewStore;
use crate::application::registry::ToolRegistry;
use crate::domain::tool::{CallResult, ToolError};
use crate::infrastructure::accelerator_client::AcceleratorClient;

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    client: Arc<AcceleratorClient>,
    interviews: InterviewStore,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, client: Arc<AcceleratorClient>) -> Self {
        Self {
            registry,
            client,
            interviews: InterviewStore::new(),
        }
    }

    /// The full catalog, rendered for `tools/list`.
    pub fn list_tools(&self) -> Vec<Value> {
        self.registry
            .descriptors()
            .iter()
            .map(|d| d.to_mcp_json())
            .collect()
    }

    /// Invoke one operation. Never fails: all outcomes are folded into the
    /// uniform `{content, isError}` envelope.
    pub async fn invoke(&self, name: &str, args: &Value) -> CallResult {
        match self.execute(name, args).await {
            Ok(text) => CallResult::text(text),
            Err(err) => {
                tracing::debug!(tool = name, error = %err, "tool call failed");
                CallResult::error(format!("Error: {}", err))
            }
        }
    }

    async fn execute(&self, name: &str, raw_args: &Value) -> Result<String, ToolError> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        // Validation happens here, before any handler or network call.
        let args = descriptor.input_schema.validate(raw_args)?;
        let client = self.client.as_ref();

        match name {
            "s2t_generate_embeddings" => embeddings::generate_embeddings(client, &args).await,

            "s2t_generate_infrastructure_template" => {
                infrastructure::generate_template(client, &args).await
            }
            "s2t_design_dynamodb_schema" => {
                infrastructure::design_dynamodb_schema(client, &args).await
            }
            "s2t_estimate_costs" => infrastructure::estimate_costs(client, &args).await,

            "s2t_validate_iam_policy" => security::validate_iam_policy(client, &args).await,
            "s2t_validate_oauth_config" => security::validate_oauth_config(client, &args).await,
            "s2t_scan_dependencies" => security::scan_dependencies(client, &args).await,
            "s2t_scan_secrets" => security::scan_secrets(client, &args).await,
            "s2t_scan_infrastructure" => security::scan_infrastructure(client, &args).await,

            "s2t_analyze_error_patterns" => {
                operations::analyze_error_patterns(client, &args).await
            }
            "s2t_get_accelerator_status" => operations::accelerator_status(client, &args).await,
            "s2t_check_cli_readiness" => operations::check_cli_readiness(client, &args).await,

            "s2t_classify_governance_decision" => {
                governance::classify_decision(client, &args).await
            }
            "s2t_assess_financial_impact" => {
                governance::assess_financial_impact(client, &args).await
            }
            "s2t_check_compliance" => governance::check_compliance(client, &args).await,
            "s2t_dispatch_domain_reviews" => {
                governance::dispatch_domain_reviews(client, &args).await
            }
            "s2t_synthesize_domain_reviews" => {
                governance::synthesize_domain_reviews(client, &args).await
            }
            "s2t_search_precedents" => governance::search_precedents(client, &args).await,
            "s2t_record_outcome" => governance::record_outcome(client, &args).await,
            "s2t_estimate_blast_radius" => {
                governance::estimate_blast_radius(client, &args).await
            }
            "s2t_generate_rollback_plan" => {
                governance::generate_rollback_plan(client, &args).await
            }

            "s2t_enqueue_agent_task" => agent_ops::enqueue_task(client, &args).await,
            "s2t_list_agent_tasks" => agent_ops::list_tasks(client, &args).await,
            "s2t_claim_agent_task" => agent_ops::claim_task(client, &args).await,
            "s2t_complete_agent_task" => agent_ops::complete_task(client, &args).await,
            "s2t_get_task_status" => agent_ops::task_status(client, &args).await,
            "s2t_store_agent_memory" => agent_ops::store_memory(client, &args).await,
            "s2t_retrieve_agent_memory" => agent_ops::retrieve_memory(client, &args).await,
            "s2t_search_agent_memory" => agent_ops::search_memory(client, &args).await,
            "s2t_delete_agent_memory" => agent_ops::delete_memory(client, &args).await,
            "s2t_create_trace_context" => agent_ops::create_trace_context(client, &args).await,
            "s2t_propagate_trace_context" => {
                agent_ops::propagate_trace_context(client, &args).await
            }
            "s2t_acquire_file_lock" => agent_ops::acquire_file_lock(client, &args).await,
            "s2t_release_file_lock" => agent_ops::release_file_lock(client, &args).await,
            "s2t_check_file_lock" => agent_ops::check_file_lock(client, &args).await,

            "s2t_start_interview" => interview::start(&self.interviews, &args),
            "s2t_answer_interview" => interview::answer(&self.interviews, &args),
            "s2t_get_interview_status" => interview::status(&self.interviews, &args),
            "s2t_finish_interview" => interview::finish(&self.interviews, &args),

            // Registry and routing table are maintained together; a
            // descriptor with no arm would be a catalog bug.
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispatcher_with(base_url: &str) -> Dispatcher {
        Dispatcher::new(
            Arc::new(ToolRegistry::new()),
            Arc::new(AcceleratorClient::new(base_url, "test-key")),
        )
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_result_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let result = dispatcher.invoke("s2t_does_not_exist", &json!({})).await;

        assert!(result.is_error);
        assert_eq!(
            result.rendered(),
            "Error: Unknown tool: s2t_does_not_exist"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_validation_failure_happens_before_any_remote_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/governance/classify")
            .expect(0)
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let result = dispatcher
            .invoke("s2t_classify_governance_decision", &json!({}))
            .await;

        assert!(result.is_error);
        assert_eq!(
            result.rendered(),
            "Error: Required parameter 'action' must be a non-empty string"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_never_panics_on_malformed_argument_bags() {
        let dispatcher = dispatcher_with("http://127.0.0.1:1");
        for bag in [json!(null), json!(42), json!("args"), json!([1, 2])] {
            let result = dispatcher.invoke("s2t_generate_embeddings", &bag).await;
            assert!(result.is_error);
        }
    }

    #[tokio::test]
    async fn test_classification_defaults_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/governance/classify")
            .match_body(mockito::Matcher::Json(json!({
                "action": "rm -rf /tmp/cache",
                "environment": "local",
                "context": "development",
            })))
            .with_body(
                r#"{"decision":"APPROVE","confidence":0.92,"reasoning":"Scoped to a cache directory."}"#,
            )
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let result = dispatcher
            .invoke(
                "s2t_classify_governance_decision",
                &json!({ "action": "rm -rf /tmp/cache" }),
            )
            .await;

        assert!(!result.is_error);
        assert!(result.rendered().contains("**Decision:** APPROVE"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_error_message_surfaces_unmodified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings/generate")
            .with_status(500)
            .with_body(r#"{"error":{"message":"Network error"}}"#)
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let result = dispatcher
            .invoke("s2t_generate_embeddings", &json!({ "text": "hello" }))
            .await;

        assert!(result.is_error);
        assert_eq!(result.rendered(), "Error: Network error");
    }

    #[tokio::test]
    async fn test_embedding_scenario_preview_and_chunk_indices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings/generate")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "titan-embed-v2",
                "normalize": true,
            })))
            .with_body(r#"{"model":"titan-embed-v2","embeddings":[{"dimensions":1024}]}"#)
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let result = dispatcher
            .invoke(
                "s2t_generate_embeddings",
                &json!({ "text": "A".repeat(150) }),
            )
            .await;

        assert!(!result.is_error);
        let text = result.rendered();
        assert!(text.contains("**Chunks:** 1"));
        assert!(text.contains("## Chunk 0"));
        let preview = text
            .lines()
            .find(|l| l.starts_with("**Preview:**"))
            .unwrap()
            .trim_start_matches("**Preview:** ")
            .to_string();
        assert_eq!(preview.chars().count(), 103);
    }

    #[tokio::test]
    async fn test_local_interview_operations_touch_no_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dispatcher = dispatcher_with(&server.url());
        let started = dispatcher
            .invoke("s2t_start_interview", &json!({ "topic": "infrastructure" }))
            .await;
        assert!(!started.is_error);
        assert!(started.rendered().contains("Question 1 of 4"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_tools_matches_registry_order() {
        let dispatcher = dispatcher_with("http://127.0.0.1:1");
        let tools = dispatcher.list_tools();
        assert_eq!(tools.len(), 39);
        assert_eq!(tools[0]["name"], "s2t_generate_embeddings");
    }
}
