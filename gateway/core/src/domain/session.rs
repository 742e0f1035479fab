// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Session Lifecycle
//!
//! Domain model for one transport session: the stateful binding between a
//! client connection and a dispatcher instance.
//!
//! ## Session Lifecycle
//!
//! ```text
//! SessionLifecycle::new()                    (Uninitialized)
//!   └─ activate()  ← on the initialization request     (Active)
//!         └─ close() ← explicit termination or stream close (Closed, terminal)
//! ```
//!
//! ## Invariants
//!
//! - `status` transitions monotonically: `Uninitialized → Active → Closed`.
//! - At most one live session exists per token; the token is the sole
//!   lookup key into the session store (enforced by the transport-layer
//!   store, which inserts on `activate` and removes on `close`).
//! - `close` is idempotent at the store level: both the explicit
//!   termination path and the stream-close path remove the entry exactly
//!   once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, server-generated session token (UUIDv4, OS-sourced randomness).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Created but not yet bound to a token (pre-initialization).
    Uninitialized,
    /// Bound and serving requests.
    Active,
    /// Terminated; no further requests are routed here. Terminal.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// The session state machine, embedded in each transport-level session.
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Transition `Uninitialized → Active` on the initialization request.
    pub fn activate(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Uninitialized {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: SessionStatus::Active,
            });
        }
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Transition to the terminal `Closed` state.
    ///
    /// # Errors
    ///
    /// Fails if the session is already closed, so the shutdown sweep can
    /// report which sessions were torn down twice.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Closed {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: SessionStatus::Closed,
            });
        }
        self.status = SessionStatus::Closed;
        Ok(())
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle_transitions() {
        let mut session = SessionLifecycle::new();
        assert_eq!(session.status(), SessionStatus::Uninitialized);

        assert!(session.activate().is_ok());
        assert_eq!(session.status(), SessionStatus::Active);

        // Activating twice is an invalid transition.
        assert!(session.activate().is_err());

        assert!(session.close().is_ok());
        assert_eq!(session.status(), SessionStatus::Closed);

        // Closed is terminal.
        assert!(session.close().is_err());
        assert!(session.activate().is_err());
    }

    #[test]
    fn test_close_from_uninitialized_is_allowed() {
        // A session whose stream drops before initialization completes
        // still tears down cleanly.
        let mut session = SessionLifecycle::new();
        assert!(session.close().is_ok());
        assert_eq!(session.status(), SessionStatus::Closed);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
