// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Graceful shutdown coordination.
//!
//! On SIGINT/SIGTERM: sweep the streamable session store invoking every
//! close path (collecting outcomes, never aborting the sweep), clear both
//! stores unconditionally, and let axum stop accepting connections. A
//! watchdog force-exits with a failure code if the whole sequence exceeds
//! the deadline, so a stuck shutdown cannot hang the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;

use crate::presentation::sse_legacy::LegacyConnectionRegistry;
use crate::presentation::streamable_http::SessionManager;

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ShutdownCoordinator {
    sessions: Arc<SessionManager>,
    legacy: Arc<LegacyConnectionRegistry>,
}

impl ShutdownCoordinator {
    pub fn new(sessions: Arc<SessionManager>, legacy: Arc<LegacyConnectionRegistry>) -> Self {
        Self { sessions, legacy }
    }

    /// Close every streamable session and clear both stores.
    ///
    /// Individual close failures are logged and counted but never abort
    /// the sweep; the stores are empty when this returns regardless of
    /// outcomes. Legacy connections get no per-connection close action;
    /// their streams die with the listener.
    pub fn drain(&self) {
        let outcomes = self.sessions.close_all();
        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();

        for (token, result) in &outcomes {
            if let Err(err) = result {
                tracing::warn!(session = %token, error = %err, "session close failed");
            }
        }
        tracing::info!(
            closed = outcomes.len() - failed,
            failed,
            legacy = self.legacy.count(),
            "shutdown sweep complete"
        );

        self.sessions.clear();
        self.legacy.clear();
    }
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM signal");
        },
    }
}

/// The future handed to `axum::serve(...).with_graceful_shutdown`.
///
/// Arms the force-exit watchdog before draining so a wedged drain cannot
/// outlive the deadline either.
pub async fn graceful(coordinator: ShutdownCoordinator) {
    shutdown_signal().await;

    tokio::spawn(async {
        tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
        tracing::error!(
            "shutdown did not complete within {}s; forcing exit",
            SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(1);
    });

    coordinator.drain();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::Dispatcher;
    use crate::application::registry::ToolRegistry;
    use crate::infrastructure::accelerator_client::AcceleratorClient;

    fn coordinator_with_sessions(
        n: usize,
    ) -> (ShutdownCoordinator, Arc<SessionManager>, Vec<String>) {
        let sessions = Arc::new(SessionManager::new());
        let tokens = (0..n)
            .map(|_| {
                let dispatcher = Dispatcher::new(
                    Arc::new(ToolRegistry::new()),
                    Arc::new(AcceleratorClient::new("http://127.0.0.1:1", "k")),
                );
                sessions.create(dispatcher).id.as_str().to_string()
            })
            .collect();
        let legacy = Arc::new(LegacyConnectionRegistry::new());
        (
            ShutdownCoordinator::new(sessions.clone(), legacy),
            sessions,
            tokens,
        )
    }

    #[test]
    fn test_drain_empties_store_with_all_sessions_healthy() {
        let (coordinator, sessions, _) = coordinator_with_sessions(4);
        assert_eq!(sessions.count(), 4);
        coordinator.drain();
        assert_eq!(sessions.count(), 0);
    }

    #[test]
    fn test_drain_empties_store_despite_close_failures() {
        let (coordinator, sessions, tokens) = coordinator_with_sessions(3);

        // Pre-close one session so its close path fails during the sweep.
        sessions.get(&tokens[0]).unwrap().close().unwrap();

        coordinator.drain();
        assert_eq!(sessions.count(), 0);
    }
}
