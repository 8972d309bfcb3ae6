//! Host-based request dispatch.
//!
//! # Responsibilities
//! - Extract the Host for every inbound request or upgrade
//! - Route tunnel hosts to their session's opaque handler
//! - Route root-domain traffic to the admission/status application
//! - Reject unknown tunnels (404) and host-less requests (400)
//!
//! # Design Decisions
//! - No cryptographic or registry work on this path; admission is strictly
//!   a root-domain operation
//! - The session is re-resolved on every request; existence can change
//!   between two requests, so nothing is cached here
//! - Upgrade requests travel the same path; denying one with a plain
//!   status response closes it without completing the upgrade

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;

use crate::gateway::server::AppState;
use crate::observability::metrics;

/// Hostname for a request: Host header first, URI authority as the
/// HTTP/2 fallback.
pub(crate) fn request_host(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get(header::HOST) {
        return value.to_str().ok().map(str::to_string);
    }
    request.uri().host().map(|host| match request.uri().port_u16() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Catch-all handler: every inbound unit of work enters here.
pub(crate) async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let Some(host) = request_host(&request) else {
        metrics::record_dispatch("missing_host");
        return (StatusCode::BAD_REQUEST, "Host header is required").into_response();
    };

    let Some(id) = state.resolver.resolve(&host) else {
        // Root-domain traffic: admission, status, or landing
        metrics::record_dispatch("root");
        return match state.root.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };
    };

    match state.sessions.lookup_session(&id).await {
        Some(session) => {
            metrics::record_dispatch("forwarded");
            tracing::debug!(id = %id, "Forwarding to tunnel session");
            session.handle_request(request).await
        }
        None => {
            metrics::record_dispatch("no_session");
            tracing::debug!(id = %id, host = %host, "No session for tunnel host");
            (StatusCode::NOT_FOUND, "404").into_response()
        }
    }
}
