// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP adapter for the remote accelerator API.
//!
//! The one component making outbound calls. Holds exactly two pieces of
//! state (base URL and API key), both fixed for process lifetime and
//! freely shared across concurrent invocations. Each call is a single
//! best-effort round trip: no retries, no per-call timeout, no caching.

use reqwest::Method;
use serde_json::Value;

use crate::domain::tool::ToolError;

/// Failures crossing the remote boundary.
///
/// `Display` output is surfaced to callers unmodified, so each variant
/// renders exactly the message the contract requires.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response; message is the remote `error.message` when
    /// present, otherwise `API error: <status>`.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a parseable response (connect failure,
    /// malformed body). Carries the underlying cause's message.
    #[error("{0}")]
    Network(String),
}

impl From<ClientError> for ToolError {
    fn from(err: ClientError) -> Self {
        ToolError::Remote(err.to_string())
    }
}

/// Client for the accelerator service. Cheap to clone; the inner reqwest
/// client pools connections.
#[derive(Debug, Clone)]
pub struct AcceleratorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AcceleratorClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request against the configured base URL.
    ///
    /// The endpoint path is forwarded as given; handlers own their fixed
    /// paths, the client does not validate them against a known list. The
    /// API key travels in the `x-api-key` header on every call.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on a non-success status,
    /// [`ClientError::Network`] when the host is unreachable or the body
    /// cannot be parsed as JSON.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .http
            .request(method, &url)
            .header("x-api-key", &self.api_key);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    /// GET is the default safe method for read operations.
    pub async fn get(&self, endpoint: &str) -> Result<Value, ClientError> {
        self.call(endpoint, Method::GET, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, ClientError> {
        self.call(endpoint, Method::POST, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, ClientError> {
        self.call(endpoint, Method::DELETE, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_api_key_header_attached_to_every_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/echo")
            .match_header("x-api-key", "test-key")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = AcceleratorClient::new(server.url(), "test-key");
        let result = client.post("/api/echo", &json!({"ping": 1})).await.unwrap();
        assert_eq!(result["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_error_message_extracted_from_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/fail")
            .with_status(422)
            .with_body(r#"{"error":{"message":"Network error"}}"#)
            .create_async()
            .await;

        let client = AcceleratorClient::new(server.url(), "test-key");
        let err = client.post("/api/fail", &json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error");
    }

    #[tokio::test]
    async fn test_generic_status_message_when_body_has_no_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/fail")
            .with_status(503)
            .with_body("oops")
            .create_async()
            .await;

        let client = AcceleratorClient::new(server.url(), "test-key");
        let err = client.get("/api/fail").await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 503");
    }

    #[tokio::test]
    async fn test_trailing_slash_normalized() {
        let client = AcceleratorClient::new("https://accelerator.s2t.dev/", "k");
        assert_eq!(client.base_url(), "https://accelerator.s2t.dev");
    }

    #[test]
    fn test_client_error_converts_to_tool_error_verbatim() {
        let err = ClientError::Network("Network error".to_string());
        let tool_err: ToolError = err.into();
        assert_eq!(tool_err.to_string(), "Network error");
    }
}
