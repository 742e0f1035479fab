// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Legacy SSE publish/subscribe transport, kept for older protocol
//! clients.
//!
//! One long-lived outbound stream per connection (`GET /sse`) plus a
//! separate message-submission endpoint (`POST /messages?sessionId=…`).
//! Two-tier identification: the store is keyed by a locally generated
//! connection id, while clients only ever learn the protocol-level session
//! id announced in the initial `endpoint` event, so the message endpoint
//! reconciles by linear scan. This binding has no explicit termination
//! request; teardown is driven solely by the stream closing.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header::HeaderMap;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::application::dispatcher::Dispatcher;
use crate::application::registry::ToolRegistry;
use crate::infrastructure::accelerator_client::AcceleratorClient;
use crate::presentation::origin::OriginPolicy;
use crate::presentation::protocol::{dispatch_request, parse_request};
use crate::presentation::streamable_http::TransportError;

/// One open legacy connection.
pub struct LegacyConnection {
    /// Local store key, never shown to clients.
    pub connection_id: Uuid,
    /// Protocol-level id the client echoes back on `POST /messages`.
    pub session_id: Uuid,
    pub dispatcher: Dispatcher,
    outbound: mpsc::Sender<Value>,
}

/// Connection store keyed by the local connection id.
#[derive(Default)]
pub struct LegacyConnectionRegistry {
    connections: RwLock<HashMap<Uuid, Arc<LegacyConnection>>>,
}

impl LegacyConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, connection: Arc<LegacyConnection>) {
        self.connections
            .write()
            .insert(connection.connection_id, connection);
    }

    pub fn remove(&self, connection_id: &Uuid) {
        self.connections.write().remove(connection_id);
    }

    /// The message endpoint only carries the protocol-level session id, so
    /// match it against open connections by scan.
    pub fn find_by_session(&self, session_id: Uuid) -> Option<Arc<LegacyConnection>> {
        self.connections
            .read()
            .values()
            .find(|c| c.session_id == session_id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.connections.read().len()
    }

    pub fn clear(&self) {
        self.connections.write().clear();
    }
}

#[derive(Clone)]
pub struct LegacySseState {
    pub connections: Arc<LegacyConnectionRegistry>,
    registry: Arc<ToolRegistry>,
    client: Arc<AcceleratorClient>,
    origins: Arc<OriginPolicy>,
}

impl LegacySseState {
    pub fn new(
        registry: Arc<ToolRegistry>,
        client: Arc<AcceleratorClient>,
        origins: Arc<OriginPolicy>,
        connections: Arc<LegacyConnectionRegistry>,
    ) -> Self {
        Self {
            connections,
            registry,
            client,
            origins,
        }
    }

    fn check_origin(&self, headers: &HeaderMap) -> Result<(), TransportError> {
        let origin = headers
            .get(axum::http::header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        if self.origins.permits(origin) {
            Ok(())
        } else {
            Err(TransportError::forbidden_origin())
        }
    }
}

pub fn router(state: LegacySseState) -> Router {
    Router::new()
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_message))
        .with_state(state)
}

/// Removes the store entry when the SSE stream is dropped.
struct ConnectionGuard {
    connections: Arc<LegacyConnectionRegistry>,
    connection_id: Uuid,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections.remove(&self.connection_id);
        tracing::info!(connection = %self.connection_id, "legacy connection closed");
    }
}

async fn handle_sse(
    State(state): State<LegacySseState>,
    headers: HeaderMap,
) -> Result<Response, TransportError> {
    state.check_origin(&headers)?;

    let (tx, rx) = mpsc::channel::<Value>(64);
    let connection = Arc::new(LegacyConnection {
        connection_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        dispatcher: Dispatcher::new(state.registry.clone(), state.client.clone()),
        outbound: tx,
    });
    state.connections.insert(connection.clone());
    tracing::info!(
        connection = %connection.connection_id,
        session = %connection.session_id,
        "legacy connection opened"
    );

    let guard = ConnectionGuard {
        connections: state.connections.clone(),
        connection_id: connection.connection_id,
    };

    // Handshake: tell the client where to submit messages.
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?sessionId={}", connection.session_id));

    let responses = ReceiverStream::new(rx).map(move |payload| {
        // The guard lives as long as this stream; dropping the stream
        // removes the store entry.
        let _held = &guard;
        Ok::<_, Infallible>(Event::default().event("message").data(payload.to_string()))
    });

    let stream = futures::stream::once(async move { Ok::<_, Infallible>(endpoint) })
        .chain(responses);

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    );
    Ok(sse.into_response())
}

#[derive(Debug, Deserialize)]
struct MessagesQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Submit one message to a legacy session. The JSON-RPC response is
/// delivered over the connection's SSE stream; the POST itself only
/// acknowledges receipt.
async fn handle_message(
    State(state): State<LegacySseState>,
    Query(query): Query<MessagesQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, TransportError> {
    state.check_origin(&headers)?;

    let session_id = Uuid::parse_str(&query.session_id)
        .map_err(|_| TransportError::legacy_session_not_found())?;
    let connection = state
        .connections
        .find_by_session(session_id)
        .ok_or_else(TransportError::legacy_session_not_found)?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| TransportError::parse_error("Request body must be valid JSON"))?;

    let request = match parse_request(&payload) {
        Ok(request) => request,
        Err(response) => {
            return Ok((StatusCode::BAD_REQUEST, Json(response)).into_response());
        }
    };

    if let Some(response) = dispatch_request(&connection.dispatcher, &request).await {
        if connection.outbound.send(response).await.is_err() {
            tracing::warn!(
                session = %session_id,
                "legacy stream closed before response delivery"
            );
        }
    }

    Ok(StatusCode::ACCEPTED.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(registry: &LegacyConnectionRegistry) -> Arc<LegacyConnection> {
        let (tx, _rx) = mpsc::channel(8);
        let connection = Arc::new(LegacyConnection {
            connection_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            dispatcher: Dispatcher::new(
                Arc::new(ToolRegistry::new()),
                Arc::new(AcceleratorClient::new("http://127.0.0.1:1", "k")),
            ),
            outbound: tx,
        });
        registry.insert(connection.clone());
        connection
    }

    #[test]
    fn test_find_by_session_scans_on_protocol_id() {
        let registry = LegacyConnectionRegistry::new();
        let a = connection(&registry);
        let b = connection(&registry);

        let found = registry.find_by_session(b.session_id).unwrap();
        assert_eq!(found.connection_id, b.connection_id);
        assert!(registry.find_by_session(Uuid::new_v4()).is_none());

        // The two identifier tiers are distinct.
        assert_ne!(a.connection_id.to_string(), a.session_id.to_string());
    }

    #[test]
    fn test_guard_removes_entry_on_drop() {
        let registry = Arc::new(LegacyConnectionRegistry::new());
        let connection = connection(&registry);
        assert_eq!(registry.count(), 1);

        let guard = ConnectionGuard {
            connections: registry.clone(),
            connection_id: connection.connection_id,
        };
        drop(guard);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_clear_is_unconditional() {
        let registry = LegacyConnectionRegistry::new();
        connection(&registry);
        connection(&registry);
        registry.clear();
        assert_eq!(registry.count(), 0);
    }
}
