//! Reverse-tunnel admission gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────┐
//!                          │               GATEWAY                       │
//!                          │                                             │
//!   <id>.<root> request    │  ┌──────────┐   ┌─────────┐   ┌──────────┐ │
//!   ───────────────────────┼─▶│ dispatch │──▶│ session │──▶│ opaque   │ │
//!                          │  │ (Host)   │   │ lookup  │   │ handler  │ │
//!                          │  └────┬─────┘   └─────────┘   └──────────┘ │
//!                          │       │ no tunnel id                       │
//!   <root> request         │       ▼                                    │
//!   ───────────────────────┼─▶ ┌──────────────────────────┐             │
//!                          │   │ root app: /api/status,   │             │
//!                          │   │ admission /{proof},      │──▶ registry │
//!                          │   │ landing fallback         │    (RPC)    │
//!                          │   └──────────────────────────┘             │
//!                          └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tunnel_gateway::config::load_config;
use tunnel_gateway::gateway::GatewayServer;
use tunnel_gateway::lifecycle::{spawn_signal_listener, Shutdown};
use tunnel_gateway::observability::{logging, metrics};
use tunnel_gateway::registry::RegistryClient;
use tunnel_gateway::session::{InMemorySessionManager, SessionManager};
use tunnel_gateway::verify::{IdentityVerifier, VerificationMessage};

#[derive(Parser)]
#[command(name = "tunnel-gateway")]
#[command(about = "Admission and dispatch gateway for a reverse-tunnel broker", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration errors are the only fatal ones
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        proof_scheme = ?config.admission.proof_scheme,
        root_domains = ?config.domains.root_domains,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = RegistryClient::new(&config.registry).await?;
    let message = VerificationMessage::new(config.admission.verification_message.as_str());
    let verifier = Arc::new(IdentityVerifier::new(
        config.admission.proof_scheme,
        message,
        Arc::new(registry),
    ));

    let sessions: Arc<dyn SessionManager> = Arc::new(InMemorySessionManager::new());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = GatewayServer::new(config, verifier, sessions);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
