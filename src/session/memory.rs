//! In-memory session manager.
//!
//! Reference implementation of the bridge used by the binary and the test
//! suite. Real deployments substitute the manager that owns the physical
//! tunnel transports; the gateway only sees the trait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use crate::session::{
    ids, SessionError, SessionInfo, SessionManager, SessionStats, TunnelHandler, TunnelSession,
};

/// Default transport socket allowance per session.
const DEFAULT_MAX_CONN_COUNT: u32 = 10;

/// How often to retry on identifier collision before giving up.
const MAX_ID_ATTEMPTS: usize = 8;

/// Produces the traffic handler for each newly created session.
pub trait TunnelHandlerFactory: Send + Sync {
    fn handler_for(&self, id: &str) -> Arc<dyn TunnelHandler>;
}

impl<F> TunnelHandlerFactory for F
where
    F: Fn(&str) -> Arc<dyn TunnelHandler> + Send + Sync,
{
    fn handler_for(&self, id: &str) -> Arc<dyn TunnelHandler> {
        self(id)
    }
}

/// Handler for sessions whose tunnel client has not attached yet.
#[derive(Default)]
pub struct OfflineHandler {
    requests_seen: AtomicUsize,
}

#[async_trait]
impl TunnelHandler for OfflineHandler {
    async fn handle_request(&self, _request: Request) -> Response {
        self.requests_seen.fetch_add(1, Ordering::Relaxed);
        (StatusCode::SERVICE_UNAVAILABLE, "tunnel not connected").into_response()
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            connected_sockets: 0,
            remote_ip: String::new(),
        }
    }
}

/// DashMap-backed session table with single-writer discipline: only
/// `create_session` and `remove_session` mutate it.
pub struct InMemorySessionManager {
    sessions: DashMap<String, TunnelSession>,
    factory: Box<dyn TunnelHandlerFactory>,
}

impl InMemorySessionManager {
    /// Manager whose sessions answer 503 until a tunnel client attaches.
    pub fn new() -> Self {
        Self::with_factory(Box::new(|_: &str| {
            Arc::new(OfflineHandler::default()) as Arc<dyn TunnelHandler>
        }))
    }

    /// Manager with a custom handler factory (used by tests).
    pub fn with_factory(factory: Box<dyn TunnelHandlerFactory>) -> Self {
        Self {
            sessions: DashMap::new(),
            factory,
        }
    }

    /// Tear down a session, e.g. when its tunnel client disconnects.
    pub fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(id = %id, "Session removed");
        }
        removed
    }
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn create_session(&self, desired_id: &str) -> Result<SessionInfo, SessionError> {
        let mut id = desired_id.to_string();
        let mut attempts = 0;

        loop {
            if attempts >= MAX_ID_ATTEMPTS {
                return Err(SessionError::Create(
                    "could not find a free identifier".to_string(),
                ));
            }

            let info = SessionInfo {
                id: id.clone(),
                max_conn_count: DEFAULT_MAX_CONN_COUNT,
            };
            let session = TunnelSession::new(info.clone(), self.factory.handler_for(&id));

            match self.sessions.entry(id.clone()) {
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    entry.insert(session);
                    tracing::info!(id = %id, "Session created");
                    return Ok(info);
                }
                dashmap::mapref::entry::Entry::Occupied(_) => {
                    // Identifier taken; mint a fresh one and retry
                    id = ids::random_id();
                    attempts += 1;
                }
            }
        }
    }

    async fn lookup_session(&self, id: &str) -> Option<TunnelSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
