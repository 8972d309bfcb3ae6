//! Session manager bridge.
//!
//! # Data Flow
//! ```text
//! AdmissionController ──create_session──▶ SessionManager (external)
//! RequestDispatcher  ──lookup_session──▶ SessionManager
//!     → TunnelSession (transient handle, valid for one request)
//!     → TunnelHandler (opaque forwarding, owned by the manager)
//! ```
//!
//! # Design Decisions
//! - This crate never owns session state; it reads through the trait and
//!   creates sessions only after a successful verification
//! - Lookups happen on every request; a session can vanish between two
//!   requests, so handles are never cached
//! - Byte-level forwarding stays behind `TunnelHandler`; the gateway sees
//!   only request-in/response-out

pub mod ids;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::response::Response;
use serde::Serialize;
use thiserror::Error;

pub use ids::random_id;
pub use memory::{InMemorySessionManager, OfflineHandler, TunnelHandlerFactory};

/// Descriptive data for an allocated session, returned to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// The subdomain identifier this session answers under.
    pub id: String,
    /// How many concurrent transport sockets the tunnel client may open.
    pub max_conn_count: u32,
}

/// Live statistics for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub connected_sockets: usize,
    /// Remote address of the tunnel client, empty until one attaches.
    pub remote_ip: String,
}

/// Opaque per-session traffic handler owned by the session manager.
#[async_trait]
pub trait TunnelHandler: Send + Sync {
    /// Forward one inbound request (or upgrade) to the tunnel.
    async fn handle_request(&self, request: Request) -> Response;

    /// Current session statistics.
    fn stats(&self) -> SessionStats;
}

/// Transient handle to a live session; fetched per request, never stored.
#[derive(Clone)]
pub struct TunnelSession {
    info: SessionInfo,
    handler: Arc<dyn TunnelHandler>,
}

impl TunnelSession {
    pub fn new(info: SessionInfo, handler: Arc<dyn TunnelHandler>) -> Self {
        Self { info, handler }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn stats(&self) -> SessionStats {
        self.handler.stats()
    }

    /// Hand the request to the session's opaque handler.
    pub async fn handle_request(&self, request: Request) -> Response {
        self.handler.handle_request(request).await
    }
}

/// Errors surfaced by the session manager.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to allocate session: {0}")]
    Create(String),
}

/// The narrow interface this gateway consumes from the session manager.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Allocate a new session, preferring `desired_id`. Identifier
    /// collisions are the manager's problem; the returned info carries the
    /// identifier actually assigned.
    async fn create_session(&self, desired_id: &str) -> Result<SessionInfo, SessionError>;

    /// Look up a live session by identifier.
    async fn lookup_session(&self, id: &str) -> Option<TunnelSession>;

    /// Number of currently active sessions.
    fn session_count(&self) -> usize;
}
