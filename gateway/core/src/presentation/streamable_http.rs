// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Streamable HTTP transport.
//!
//! Supports many concurrent sessions identified by a server-issued token
//! carried in the `Mcp-Session-Id` header. `POST /mcp` submits requests
//! (an `initialize` with no token creates a session), `GET /mcp` opens the
//! per-session SSE push stream, `DELETE /mcp` terminates a session, and
//! `GET /health` reports liveness plus per-binding session counts.
//!
//! ## Session store invariants
//!
//! - Store contents == live sessions: insertion happens only in
//!   [`SessionManager::create`], removal only in
//!   [`SessionManager::terminate`] and the shutdown sweep.
//! - Removal is idempotent; a stale token is indistinguishable from a
//!   never-issued one.
//! - Store operations are short synchronous critical sections; no lock is
//!   held across an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::header::HeaderMap;
use axum::http::{HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::application::dispatcher::Dispatcher;
use crate::application::registry::ToolRegistry;
use crate::domain::session::{SessionError, SessionId, SessionLifecycle, SessionStatus};
use crate::infrastructure::accelerator_client::AcceleratorClient;
use crate::presentation::origin::OriginPolicy;
use crate::presentation::protocol::{
    self, dispatch_request, error_codes, error_response, parse_request,
};
use crate::presentation::sse_legacy::LegacyConnectionRegistry;

pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// One live streamable session: token, lifecycle state, a dispatcher of
/// its own, and the broadcast channel feeding its SSE stream.
pub struct McpSession {
    pub id: SessionId,
    lifecycle: Mutex<SessionLifecycle>,
    pub dispatcher: Dispatcher,
    events: broadcast::Sender<Value>,
}

impl McpSession {
    fn new(dispatcher: Dispatcher) -> Self {
        let (events, _) = broadcast::channel(64);
        let mut lifecycle = SessionLifecycle::new();
        // A freshly constructed lifecycle always accepts activation.
        lifecycle.activate().ok();
        Self {
            id: SessionId::generate(),
            lifecycle: Mutex::new(lifecycle),
            dispatcher,
            events,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.lifecycle.lock().status()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.events.subscribe()
    }

    /// Push a server-initiated message to any attached SSE streams.
    pub fn push(&self, payload: Value) {
        let _ = self.events.send(payload);
    }

    /// Transition to `Closed`. Fails if already closed; the store removal
    /// around this call is what makes teardown idempotent.
    pub fn close(&self) -> Result<(), SessionError> {
        self.lifecycle.lock().close()
    }
}

/// Keyed store of live sessions. The token is the sole lookup key.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<McpSession>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, dispatcher: Dispatcher) -> Arc<McpSession> {
        let session = Arc::new(McpSession::new(dispatcher));
        self.sessions
            .write()
            .insert(session.id.as_str().to_string(), session.clone());
        session
    }

    pub fn get(&self, token: &str) -> Option<Arc<McpSession>> {
        self.sessions.read().get(token).cloned()
    }

    /// Close and remove a session. Returns `false` when the token is
    /// unknown, including when it was already terminated.
    pub fn terminate(&self, token: &str) -> bool {
        let removed = self.sessions.write().remove(token);
        match removed {
            Some(session) => {
                if let Err(err) = session.close() {
                    tracing::warn!(session = token, error = %err, "close on terminate failed");
                }
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Shutdown sweep: close every session, collecting each outcome
    /// without letting one failure abort the rest.
    pub fn close_all(&self) -> Vec<(String, Result<(), SessionError>)> {
        let snapshot: Vec<(String, Arc<McpSession>)> = self
            .sessions
            .read()
            .iter()
            .map(|(token, session)| (token.clone(), session.clone()))
            .collect();

        snapshot
            .into_iter()
            .map(|(token, session)| (token, session.close()))
            .collect()
    }

    pub fn clear(&self) {
        self.sessions.write().clear();
    }
}

/// Shared state for the streamable binding. `/health` also reports the
/// legacy binding's connection count, so both registries live here.
#[derive(Clone)]
pub struct StreamableHttpState {
    pub sessions: Arc<SessionManager>,
    pub legacy: Arc<LegacyConnectionRegistry>,
    registry: Arc<ToolRegistry>,
    client: Arc<AcceleratorClient>,
    origins: Arc<OriginPolicy>,
    start_time: Instant,
}

impl StreamableHttpState {
    pub fn new(
        registry: Arc<ToolRegistry>,
        client: Arc<AcceleratorClient>,
        origins: Arc<OriginPolicy>,
        sessions: Arc<SessionManager>,
        legacy: Arc<LegacyConnectionRegistry>,
    ) -> Self {
        Self {
            sessions,
            legacy,
            registry,
            client,
            origins,
            start_time: Instant::now(),
        }
    }

    /// Each session gets a dispatcher of its own, bound to the shared
    /// registry and client.
    fn new_dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.registry.clone(), self.client.clone())
    }

    fn check_origin(&self, headers: &HeaderMap) -> Result<(), TransportError> {
        let origin = headers
            .get(axum::http::header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        if self.origins.permits(origin) {
            Ok(())
        } else {
            tracing::warn!(origin = origin.unwrap_or(""), "origin rejected");
            Err(TransportError::forbidden_origin())
        }
    }
}

pub fn router(state: StreamableHttpState) -> Router {
    Router::new()
        .route(
            "/mcp",
            axum::routing::post(handle_post)
                .get(handle_get)
                .delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Transport-level errors, reported before any dispatch happens. Distinct
/// from the tool-call error envelope: these are JSON-RPC error bodies with
/// an HTTP status.
#[derive(Debug)]
pub struct TransportError {
    status: StatusCode,
    code: i64,
    message: String,
}

impl TransportError {
    pub fn missing_session() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: error_codes::INVALID_REQUEST,
            message: "Mcp-Session-Id header is required".to_string(),
        }
    }

    pub fn unknown_session() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: error_codes::SESSION_NOT_FOUND,
            message: "Session not found or already terminated".to_string(),
        }
    }

    pub fn forbidden_origin() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: error_codes::INVALID_REQUEST,
            message: "Origin not allowed".to_string(),
        }
    }

    pub fn legacy_session_not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: error_codes::SESSION_NOT_FOUND,
            message: "Session not found. Connect to /sse first".to_string(),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: error_codes::PARSE_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let body = Json(error_response(Value::Null, self.code, self.message));
        (self.status, body).into_response()
    }
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

async fn handle_post(
    State(state): State<StreamableHttpState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, TransportError> {
    state.check_origin(&headers)?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| TransportError::parse_error("Request body must be valid JSON"))?;

    // A bare JSON-RPC response from the client (we issued no request, but
    // acknowledge per protocol).
    if payload.get("method").is_none()
        && (payload.get("result").is_some() || payload.get("error").is_some())
    {
        return Ok(StatusCode::ACCEPTED.into_response());
    }

    let request = match parse_request(&payload) {
        Ok(request) => request,
        Err(response) => {
            return Ok((StatusCode::BAD_REQUEST, Json(response)).into_response());
        }
    };

    let token = session_header(&headers);

    // Initialization with no token: mint a session and hand the token back.
    if request.is_initialize() && token.is_none() {
        let session = state.sessions.create(state.new_dispatcher());
        tracing::info!(session = %session.id, "session initialized");

        let response = dispatch_request(&session.dispatcher, &request)
            .await
            .unwrap_or_else(|| json!({}));
        let mut http_response = Json(response).into_response();
        http_response.headers_mut().insert(
            MCP_SESSION_ID_HEADER,
            HeaderValue::from_str(session.id.as_str())
                .expect("session token is always a valid header value"),
        );
        return Ok(http_response);
    }

    // Everything else requires a known token.
    let token = token.ok_or_else(TransportError::missing_session)?;
    let session = state
        .sessions
        .get(token)
        .ok_or_else(TransportError::unknown_session)?;

    match dispatch_request(&session.dispatcher, &request).await {
        Some(response) => Ok(Json(response).into_response()),
        None => Ok(StatusCode::ACCEPTED.into_response()),
    }
}

/// Open the server-push SSE stream for an existing session.
async fn handle_get(
    State(state): State<StreamableHttpState>,
    headers: HeaderMap,
) -> Result<Response, TransportError> {
    state.check_origin(&headers)?;
    let token = session_header(&headers).ok_or_else(TransportError::missing_session)?;
    let session = state
        .sessions
        .get(token)
        .ok_or_else(TransportError::unknown_session)?;

    let stream = BroadcastStream::new(session.subscribe()).filter_map(|item| async move {
        match item {
            Ok(payload) => Some(Ok::<_, std::convert::Infallible>(
                Event::default().data(payload.to_string()),
            )),
            // A lagged reader just skips ahead.
            Err(_) => None,
        }
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    );
    Ok(sse.into_response())
}

/// Explicit session termination: close synchronously, remove exactly once.
async fn handle_delete(
    State(state): State<StreamableHttpState>,
    headers: HeaderMap,
) -> Result<Response, TransportError> {
    state.check_origin(&headers)?;
    let token = session_header(&headers).ok_or_else(TransportError::missing_session)?;

    if state.sessions.terminate(token) {
        tracing::info!(session = token, "session terminated");
        Ok(Json(json!({ "status": "terminated" })).into_response())
    } else {
        Err(TransportError::unknown_session())
    }
}

async fn handle_health(State(state): State<StreamableHttpState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "server": protocol::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "sessions": {
            "streamable": state.sessions.count(),
            "legacy": state.legacy.count(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_sessions(n: usize) -> (SessionManager, Vec<String>) {
        let manager = SessionManager::new();
        let tokens = (0..n)
            .map(|_| {
                let dispatcher = Dispatcher::new(
                    Arc::new(ToolRegistry::new()),
                    Arc::new(AcceleratorClient::new("http://127.0.0.1:1", "k")),
                );
                manager.create(dispatcher).id.as_str().to_string()
            })
            .collect();
        (manager, tokens)
    }

    #[test]
    fn test_create_then_terminate_removes_exactly_once() {
        let (manager, tokens) = manager_with_sessions(1);
        let token = &tokens[0];

        assert!(manager.get(token).is_some());
        assert!(manager.terminate(token));

        // Stale token now behaves like a never-issued one.
        assert!(manager.get(token).is_none());
        assert!(!manager.terminate(token));
        assert!(manager.get("never-issued").is_none());
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_close_all_collects_every_outcome_and_clear_empties_store() {
        let (manager, tokens) = manager_with_sessions(3);

        // Pre-close one session so the sweep sees a mixed outcome.
        manager.get(&tokens[1]).unwrap().close().unwrap();

        let outcomes = manager.close_all();
        assert_eq!(outcomes.len(), 3);
        let failures = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        assert_eq!(failures, 1);

        manager.clear();
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_sessions_activate_on_creation() {
        let (manager, tokens) = manager_with_sessions(1);
        let session = manager.get(&tokens[0]).unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn test_push_reaches_subscribers() {
        let (manager, tokens) = manager_with_sessions(1);
        let session = manager.get(&tokens[0]).unwrap();
        let mut rx = session.subscribe();
        session.push(json!({ "kind": "notice" }));
        let received = rx.try_recv().unwrap();
        assert_eq!(received["kind"], "notice");
    }
}
