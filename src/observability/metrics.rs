//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_admissions_total` (counter): admission attempts by outcome
//! - `gateway_dispatch_total` (counter): inbound units of work by outcome
//! - `gateway_registry_healthy` (gauge): 1=reachable, 0=unreachable
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations behind the metrics macros)
//! - Exposition via a Prometheus scrape endpoint on its own listener
//! - Recording is a no-op until an exporter is installed, so tests and
//!   library users pay nothing

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and register metric descriptions.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_admissions_total",
                "Admission attempts by outcome (admitted/rejected)"
            );
            describe_counter!(
                "gateway_dispatch_total",
                "Dispatched inbound requests by outcome"
            );
            describe_gauge!(
                "gateway_registry_healthy",
                "Whether the operator registry RPC is reachable"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one admission attempt.
pub fn record_admission(admitted: bool) {
    let outcome = if admitted { "admitted" } else { "rejected" };
    counter!("gateway_admissions_total", "outcome" => outcome).increment(1);
}

/// Record one dispatched unit of work.
///
/// Outcomes: `forwarded`, `no_session`, `missing_host`, `root`.
pub fn record_dispatch(outcome: &'static str) {
    counter!("gateway_dispatch_total", "outcome" => outcome).increment(1);
}

/// Record registry reachability.
pub fn record_registry_health(healthy: bool) {
    gauge!("gateway_registry_healthy").set(if healthy { 1.0 } else { 0.0 });
}
