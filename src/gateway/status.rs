//! Status endpoints on the root domain.
//!
//! `GET /api/status` reports the active tunnel count and best-effort
//! process memory telemetry; `GET /api/tunnels/{id}/status` reports one
//! session's connection statistics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::gateway::admission::RootState;

/// Best-effort process memory readout.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryUsage {
    pub rss_bytes: u64,
    pub vsz_bytes: u64,
}

#[derive(Serialize)]
pub(crate) struct GatewayStatus {
    tunnels: usize,
    mem: MemoryUsage,
}

#[derive(Serialize)]
struct TunnelStatus {
    connected_sockets: usize,
    remote_ip: String,
}

pub(crate) async fn api_status(State(state): State<RootState>) -> Json<GatewayStatus> {
    Json(GatewayStatus {
        tunnels: state.sessions.session_count(),
        mem: memory_usage(),
    })
}

pub(crate) async fn tunnel_status(
    State(state): State<RootState>,
    Path(id): Path<String>,
) -> Response {
    match state.sessions.lookup_session(&id).await {
        Some(session) => {
            let stats = session.stats();
            Json(TunnelStatus {
                connected_sockets: stats.connected_sockets,
                remote_ip: stats.remote_ip,
            })
            .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Read RSS/VSZ from procfs where available; zeros elsewhere.
fn memory_usage() -> MemoryUsage {
    #[cfg(target_os = "linux")]
    {
        if let Some(usage) = statm_usage() {
            return usage;
        }
    }
    MemoryUsage {
        rss_bytes: 0,
        vsz_bytes: 0,
    }
}

#[cfg(target_os = "linux")]
fn statm_usage() -> Option<MemoryUsage> {
    // statm reports pages: size (vsz) then resident (rss)
    const PAGE_SIZE: u64 = 4096;
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let mut fields = statm.split_whitespace();
    let vsz_pages: u64 = fields.next()?.parse().ok()?;
    let rss_pages: u64 = fields.next()?.parse().ok()?;
    Some(MemoryUsage {
        rss_bytes: rss_pages * PAGE_SIZE,
        vsz_bytes: vsz_pages * PAGE_SIZE,
    })
}
