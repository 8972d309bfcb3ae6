//! Admission control.
//!
//! # Responsibilities
//! - Accept exactly one non-empty path segment on the root domain as an
//!   admission attempt (the router shape enforces this; `/`, `/a/b` and
//!   `/a/` fall through to the landing fallback instead)
//! - Parse and verify the embedded identity proof
//! - Allocate a session on success and return its public URL
//!
//! # Design Decisions
//! - A rejected proof answers 201 with a fixed message, a deliberate
//!   deviation from 4xx that is part of the wire contract
//! - Session identifiers are minted fresh per admission; verifying the same
//!   payload twice yields two distinct sessions

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;

use crate::config::UrlScheme;
use crate::gateway::dispatch::request_host;
use crate::observability::metrics;
use crate::session::{ids, SessionManager};
use crate::verify::{AdmissionPayload, IdentityVerifier};

/// Fixed body returned for every failed admission attempt.
pub const REJECTION_MESSAGE: &str = "Could not verify K3 Registration Message";

/// State shared by the root-domain application (admission + status).
#[derive(Clone)]
pub struct RootState {
    pub verifier: Arc<IdentityVerifier>,
    pub sessions: Arc<dyn SessionManager>,
    pub scheme: UrlScheme,
    pub landing_url: Option<String>,
}

#[derive(Serialize)]
struct AdmissionGranted {
    id: String,
    url: String,
    max_conn_count: u32,
}

#[derive(Serialize)]
struct AdmissionRejected {
    message: &'static str,
}

fn rejected() -> Response {
    (
        StatusCode::CREATED,
        Json(AdmissionRejected {
            message: REJECTION_MESSAGE,
        }),
    )
        .into_response()
}

/// Handle a single-segment admission attempt.
pub(crate) async fn admit(
    State(state): State<RootState>,
    Path(proof): Path<String>,
    request: Request,
) -> Response {
    let payload = match AdmissionPayload::parse(&proof, state.verifier.scheme()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed admission payload");
            metrics::record_admission(false);
            return rejected();
        }
    };

    let result = state.verifier.verify(&payload).await;
    metrics::record_admission(result.admitted);
    if !result.admitted {
        return rejected();
    }

    // The dispatcher only hands host-bearing requests to this application
    let Some(host) = request_host(&request) else {
        return (StatusCode::BAD_REQUEST, "Host header is required").into_response();
    };

    let desired_id = ids::random_id();
    let info = match state.sessions.create_session(&desired_id).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!(error = %e, "Session allocation failed after admission");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to allocate tunnel session",
            )
                .into_response();
        }
    };

    let url = format!("{}://{}.{}", state.scheme, info.id, host);
    tracing::info!(
        id = %info.id,
        operator_index = ?result.operator_index,
        "Tunnel session admitted"
    );

    (
        StatusCode::OK,
        Json(AdmissionGranted {
            url,
            id: info.id,
            max_conn_count: info.max_conn_count,
        }),
    )
        .into_response()
}

/// Fallback for root-domain requests that are not admission or status
/// requests: redirect to the landing page when configured, 404 otherwise.
pub(crate) async fn landing(State(state): State<RootState>) -> Response {
    match &state.landing_url {
        Some(url) => Redirect::temporary(url).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
