// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Contract tests for the dispatch path: validation messages, default
//! forwarding, and error-envelope totality across the whole catalog.

use std::sync::Arc;

use serde_json::json;

use s2t_gateway_core::application::dispatcher::Dispatcher;
use s2t_gateway_core::application::registry::ToolRegistry;
use s2t_gateway_core::infrastructure::accelerator_client::AcceleratorClient;

fn dispatcher(base_url: &str) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ToolRegistry::new()),
        Arc::new(AcceleratorClient::new(base_url, "test-key")),
    )
}

/// For every operation declaring required fields, an empty argument bag
/// must fail fast naming the first declared required field, before any
/// network traffic.
#[tokio::test]
async fn test_missing_required_fields_fail_fast_across_catalog() {
    let mut server = mockito::Server::new_async().await;
    let mocks = [
        server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await,
        server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await,
        server
            .mock("DELETE", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await,
    ];

    let registry = ToolRegistry::new();
    let dispatcher = dispatcher(&server.url());

    for descriptor in registry.descriptors() {
        let Some(first_required) = descriptor
            .input_schema
            .fields()
            .iter()
            .find(|field| field.required)
        else {
            continue;
        };

        let result = dispatcher.invoke(descriptor.name, &json!({})).await;
        assert!(result.is_error, "{} accepted an empty bag", descriptor.name);
        let text = result.rendered();
        assert!(
            text.starts_with(&format!(
                "Error: Required parameter '{}' must be ",
                first_required.name
            )),
            "{} reported: {}",
            descriptor.name,
            text
        );
    }

    for mock in &mocks {
        mock.assert_async().await;
    }
}

/// Omitted optional fields are forwarded with exactly their declared
/// defaults.
#[tokio::test]
async fn test_declared_defaults_forwarded_to_the_remote() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/governance/precedents/search")
        .match_body(mockito::Matcher::Json(json!({
            "query": "delete production database",
            "limit": 10,
        })))
        .with_body(r#"{"precedents":[]}"#)
        .create_async()
        .await;

    let dispatcher = dispatcher(&server.url());
    let result = dispatcher
        .invoke(
            "s2t_search_precedents",
            &json!({ "query": "delete production database" }),
        )
        .await;

    assert!(!result.is_error, "{}", result.rendered());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_risk_classification_scenario() {
    let mut server = mockito::Server::new_async().await;
    let classify = server
        .mock("POST", "/api/governance/classify")
        .match_body(mockito::Matcher::Json(json!({
            "action": "rm -rf /tmp/cache",
            "environment": "local",
            "context": "development",
        })))
        .with_body(r#"{"decision":"APPROVE","confidence":0.9,"reasoning":"Cache paths are rebuildable."}"#)
        .create_async()
        .await;

    let dispatcher = dispatcher(&server.url());

    // Missing action fails before any remote call.
    let invalid = dispatcher
        .invoke("s2t_classify_governance_decision", &json!({}))
        .await;
    assert!(invalid.is_error);
    assert_eq!(
        invalid.rendered(),
        "Error: Required parameter 'action' must be a non-empty string"
    );

    let result = dispatcher
        .invoke(
            "s2t_classify_governance_decision",
            &json!({ "action": "rm -rf /tmp/cache" }),
        )
        .await;
    assert!(!result.is_error);
    assert!(result.rendered().contains("APPROVE"));
    classify.assert_async().await;
}

/// A remote failure message rides through any handler byte-for-byte.
#[tokio::test]
async fn test_remote_failure_passes_through_every_handler_unmodified() {
    let mut server = mockito::Server::new_async().await;
    for endpoint in [
        "/api/security/oauth/validate",
        "/api/governance/rollback/plan",
        "/api/agents/tasks/enqueue",
    ] {
        server
            .mock("POST", endpoint)
            .with_status(500)
            .with_body(r#"{"error":{"message":"Network error"}}"#)
            .create_async()
            .await;
    }

    let dispatcher = dispatcher(&server.url());
    let calls = [
        (
            "s2t_validate_oauth_config",
            json!({ "provider": "github", "config": {} }),
        ),
        (
            "s2t_generate_rollback_plan",
            json!({ "action": "scale down workers" }),
        ),
        ("s2t_enqueue_agent_task", json!({ "task": "refresh index" })),
    ];

    for (name, args) in calls {
        let result = dispatcher.invoke(name, &args).await;
        assert!(result.is_error);
        assert_eq!(result.rendered(), "Error: Network error", "{}", name);
    }
}

/// Formatting is idempotent: the same remote response renders the same
/// text on repeated calls.
#[tokio::test]
async fn test_round_trip_formatting_is_deterministic() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/governance/blast-radius")
        .with_body(
            r#"{"radius":"single-service","affected_systems":["billing-api"],"notes":"Scoped to one deployment."}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let dispatcher = dispatcher(&server.url());
    let args = json!({ "action": "rotate signing key", "environment": "staging" });

    let first = dispatcher.invoke("s2t_estimate_blast_radius", &args).await;
    let second = dispatcher.invoke("s2t_estimate_blast_radius", &args).await;
    assert_eq!(first, second);
    assert!(first.rendered().contains("single-service"));
}

/// DELETE-method operations route through the client's delete path.
#[tokio::test]
async fn test_destructive_memory_delete_uses_delete_method() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/agents/memory/default/scratch")
        .with_body(r#"{"deleted":true}"#)
        .create_async()
        .await;

    let dispatcher = dispatcher(&server.url());
    let result = dispatcher
        .invoke("s2t_delete_agent_memory", &json!({ "key": "scratch" }))
        .await;

    assert!(!result.is_error);
    assert!(result.rendered().contains("**Deleted:** true"));
    mock.assert_async().await;
}
